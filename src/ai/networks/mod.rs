mod value_network;

pub use value_network::{model_file_path, ValueNetwork, ValueNetworkConfig};
