pub mod concert;
