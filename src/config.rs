use argh::FromArgs;

/// Port the database server listens on inside the container.
pub const SERVER_PORT: u16 = 27017;

pub const DEFAULT_CONTAINER: &str = "my-mongodb";
pub const DEFAULT_IMAGE: &str = "mongo:latest";
pub const DEFAULT_RUNTIME: &str = "docker";

#[derive(FromArgs, Debug)]
/// Interactive menu for running a MongoDB server in a container.
pub struct Args {
    #[argh(option, default = "DEFAULT_CONTAINER.to_string()")]
    /// name of the managed container (default: my-mongodb)
    pub container: String,

    #[argh(option, default = "DEFAULT_IMAGE.to_string()")]
    /// image the container is created from (default: mongo:latest)
    pub image: String,

    #[argh(option, short = 'p', default = "SERVER_PORT")]
    /// host port published for the server (default: 27017)
    pub port: u16,

    #[argh(option, default = "DEFAULT_RUNTIME.to_string()")]
    /// container runtime executable, e.g. docker or podman (default: docker)
    pub runtime: String,

    #[argh(switch)]
    /// disable colored output
    pub no_color: bool,
}

/// Settings fixed at startup and shared read-only by every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub container: String,
    pub image: String,
    pub host_port: u16,
    pub runtime: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            container: DEFAULT_CONTAINER.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            host_port: SERVER_PORT,
            runtime: DEFAULT_RUNTIME.to_string(),
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            container: args.container.clone(),
            image: args.image.clone(),
            host_port: args.port,
            runtime: args.runtime.clone(),
        }
    }
}
