//! Container runtime invocations for the managed container.

use crate::command::Invocation;
use crate::config::{Config, SERVER_PORT};

/// Builds every container-runtime call made for one configured container.
#[derive(Debug, Clone, Copy)]
pub struct ContainerRuntime<'a> {
    config: &'a Config,
}

impl<'a> ContainerRuntime<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn container(&self) -> &str {
        &self.config.container
    }

    fn invocation(&self) -> Invocation {
        Invocation::new(&self.config.runtime)
    }

    /// Anchored so `my-mongodb` does not also match `my-mongodb-old`.
    fn name_filter(&self) -> String {
        format!("name=^{}$", self.config.container)
    }

    /// IDs of running containers with the configured name.
    pub fn list_running(&self) -> Invocation {
        self.invocation()
            .args(["ps", "-q", "-f"])
            .arg(self.name_filter())
    }

    /// IDs of containers with the configured name, in any state.
    pub fn list_all(&self) -> Invocation {
        self.invocation()
            .args(["ps", "-a", "-q", "-f"])
            .arg(self.name_filter())
    }

    pub fn run_detached(&self) -> Invocation {
        self.invocation()
            .args(["run", "-d", "--name"])
            .arg(self.container())
            .arg("-p")
            .arg(format!("{}:{}", self.config.host_port, SERVER_PORT))
            .arg(&self.config.image)
    }

    pub fn stop(&self) -> Invocation {
        self.invocation().arg("stop").arg(self.container())
    }

    pub fn remove(&self) -> Invocation {
        self.invocation().arg("rm").arg(self.container())
    }

    pub fn follow_logs(&self) -> Invocation {
        self.invocation().args(["logs", "-f"]).arg(self.container())
    }

    /// Run `command` inside the container.
    ///
    /// Each `(name, value)` in `envs` is set on the runtime client and forwarded
    /// with a bare `-e name`, so values never show up in the argument list.
    pub fn exec<I, S>(&self, interactive: bool, envs: &[(&str, &str)], command: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inv = self.invocation().arg("exec");
        if interactive {
            inv = inv.arg("-i");
        }
        for (name, value) in envs {
            inv = inv.arg("-e").arg(*name).env(*name, *value);
        }
        inv.arg(self.container()).args(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_detached_publishes_server_port() {
        let config = Config::default();
        let inv = ContainerRuntime::new(&config).run_detached();
        assert_eq!(inv.program(), "docker");
        assert_eq!(
            inv.get_args(),
            ["run", "-d", "--name", "my-mongodb", "-p", "27017:27017", "mongo:latest"]
        );
    }

    #[test]
    fn custom_host_port_maps_to_server_port() {
        let config = Config {
            host_port: 28000,
            runtime: "podman".to_string(),
            ..Config::default()
        };
        let inv = ContainerRuntime::new(&config).run_detached();
        assert_eq!(inv.program(), "podman");
        assert!(inv.get_args().contains(&"28000:27017".to_string()));
    }

    #[test]
    fn listing_uses_anchored_name_filter() {
        let config = Config::default();
        let rt = ContainerRuntime::new(&config);
        assert_eq!(rt.list_running().get_args(), ["ps", "-q", "-f", "name=^my-mongodb$"]);
        assert_eq!(
            rt.list_all().get_args(),
            ["ps", "-a", "-q", "-f", "name=^my-mongodb$"]
        );
    }

    #[test]
    fn exec_forwards_environment_by_name_only() {
        let config = Config::default();
        let inv = ContainerRuntime::new(&config).exec(
            true,
            &[("SECRET", "s3cr3t")],
            ["mongosh", "--quiet"],
        );
        assert_eq!(
            inv.get_args(),
            ["exec", "-i", "-e", "SECRET", "my-mongodb", "mongosh", "--quiet"]
        );
        assert_eq!(inv.get_envs(), [("SECRET".to_string(), "s3cr3t".to_string())]);
        assert!(!inv.get_args().iter().any(|a| a.contains("s3cr3t")));
    }

    #[test]
    fn stop_remove_and_logs_name_the_container() {
        let config = Config::default();
        let rt = ContainerRuntime::new(&config);
        assert_eq!(rt.stop().get_args(), ["stop", "my-mongodb"]);
        assert_eq!(rt.remove().get_args(), ["rm", "my-mongodb"]);
        assert_eq!(rt.follow_logs().get_args(), ["logs", "-f", "my-mongodb"]);
    }
}
