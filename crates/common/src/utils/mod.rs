pub mod keccak;
