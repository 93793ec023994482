pub mod graphql_client;
pub mod in_memory;

pub use graphql_client::GraphqlClient;
pub use in_memory::{InMemoryMarketplace, MarketplaceFixture};
