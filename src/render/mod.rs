/// Rendering layer: turns a `PivotTable` into the dark-themed HTML artifact
/// offered for download. The in-session egui table lives in `ui::table`.

pub mod html;
