pub mod census;
pub mod chunked;
pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod fixed_width;

pub use census::{clean_measure_label, clean_measure_value, read_census_table, reshape_census_table};
pub use chunked::{ChunkOptions, CsvChunk, CsvRow, DEFAULT_CHUNK_ROWS, DelimitedChunkReader};
pub use csv_table::{CsvTable, index_headers, read_csv_table};
pub use discovery::{CraDiscovery, discover_cra_files, list_dat_files, list_files};
pub use error::{IngestError, Result};
pub use fixed_width::{FixedWidthLines, NumberedLine};
