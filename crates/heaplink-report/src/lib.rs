//! Heaplink Report — HTML rendering over the analysis output
//!
//! Pure presentation: both reports read the two runtimes and a result
//! structure and render static HTML with the shared table styling.

mod matching;
mod code_link;


pub use code_link::CodeLinkReport;
pub use matching::MatchingReport;

pub(crate) const TABLE_STYLE: &str = "
table { border-collapse: collapse; width: 100%; font-family: sans-serif; margin-bottom: 20px; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
.improvement { color: green; }
.regression { color: red; }
.neutral { color: #666; }
h1, h2 { font-family: sans-serif; }
.file-header { background-color: #e9e9e9; padding: 10px; border-radius: 5px; margin-top: 30px; }
";
