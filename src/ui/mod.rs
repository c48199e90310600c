/// egui rendering of the analysis page.
pub mod panels;
pub mod plot;
pub mod report;
