//! beanflow-ingest: statement ingestion (CSV) and bank-specific decoders.

pub mod parsers;

pub use parsers::stgeorge::{
    decode_description, parse_stgeorge_csv, parse_stgeorge_reader, DescriptionFields,
};
