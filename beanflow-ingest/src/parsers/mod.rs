pub mod stgeorge;
