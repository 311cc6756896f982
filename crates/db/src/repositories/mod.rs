pub mod concert_repo;

pub use concert_repo::ConcertRepo;
