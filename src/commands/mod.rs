mod process;

pub use process::{default_output_path, load_pool, process, ProcessOutcome, ProcessRequest};
