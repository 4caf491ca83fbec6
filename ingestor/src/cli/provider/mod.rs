pub mod wtss;
