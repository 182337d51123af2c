pub mod csv_io;
pub mod table;
pub mod value;

pub use csv_io::{read_dataset, write_dataset};
pub use table::Dataset;
pub use value::{Record, Value};
