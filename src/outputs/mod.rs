//! Output writers for the pipeline's tabular artifacts.
//!
//! # Output Structure
//!
//! ```text
//! data/
//! ├── raw/
//! │   ├── news_raw.csv     # crawl: title, date, content, source, url, country
//! │   └── weibo_raw.csv    # merge-exports: country, source, source_type, date, user_name, content
//! └── processed/
//!     └── all_texts.csv    # build: country, source, source_type, date, title, content, url
//! ```
//!
//! Every file is UTF-8 with a byte-order marker so spreadsheet tools pick
//! the right encoding for CJK text.

pub mod csv;
