pub mod app_config;
pub mod database;
pub mod booking_repo;
pub mod member_repo;
pub mod memory;
pub mod product_repo;
pub mod redis_repo;
pub mod trip_repo;

pub use database::DbClient;
pub use redis_repo::RedisClient;
pub use booking_repo::StoreBookingRepository;
pub use member_repo::StoreMemberRepository;
pub use product_repo::StoreProductRepository;
pub use trip_repo::StoreTripRepository;
