// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Upload decoding and delimited text loading

mod csv_loader;
mod encoding;

pub use csv_loader::{infer_value, CsvLoader};
pub use encoding::decode_upload;
