use crate::replication::Role;

/// Server configuration, built once from process arguments at startup and
/// passed around as `Arc<Config>`. Nothing here changes at runtime; in
/// particular the node role is fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    /// Master address when running as a slave.
    pub slaveof: Option<(String, u16)>,
    /// Path of the append-only persistence log.
    pub aof_path: String,
    /// Interval between background flushes of the append log, in ms.
    pub flush_interval_ms: u64,
    /// Interval between active expiration sweeps, in ms.
    pub sweep_interval_ms: u64,
    /// Max entries examined per expiration sweep.
    pub expire_sample_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "127.0.0.1".to_string(),
            port: 6379,
            slaveof: None,
            aof_path: "ember.aof".to_string(),
            flush_interval_ms: 1000,
            sweep_interval_ms: 1000,
            expire_sample_size: 20,
        }
    }
}

impl Config {
    /// Parse command line arguments: `-port <n>`, `-slaveof <host> <port>`.
    /// Unknown flags are ignored.
    pub fn from_args(args: &[String]) -> Self {
        let mut config = Config::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-port" => {
                    if i + 1 < args.len() {
                        if let Ok(p) = args[i + 1].parse() {
                            config.port = p;
                        }
                        i += 1;
                    }
                }
                "-slaveof" => {
                    if i + 2 < args.len() {
                        let host = args[i + 1].clone();
                        if let Ok(port) = args[i + 2].parse() {
                            config.slaveof = Some((host, port));
                        }
                        i += 2;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        config
    }

    pub fn role(&self) -> Role {
        if self.slaveof.is_some() {
            Role::Slave
        } else {
            Role::Master
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(&[]);
        assert_eq!(config.port, 6379);
        assert_eq!(config.slaveof, None);
        assert_eq!(config.role(), Role::Master);
    }

    #[test]
    fn test_port_flag() {
        let config = Config::from_args(&args(&["-port", "7000"]));
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn test_slaveof_flag() {
        let config = Config::from_args(&args(&["-port", "7001", "-slaveof", "localhost", "7000"]));
        assert_eq!(config.port, 7001);
        assert_eq!(config.slaveof, Some(("localhost".to_string(), 7000)));
        assert_eq!(config.role(), Role::Slave);
    }

    #[test]
    fn test_unknown_flags_ignored() {
        let config = Config::from_args(&args(&["-frobnicate", "-port", "7002"]));
        assert_eq!(config.port, 7002);
    }
}
