#[cfg(test)]
pub mod test {
    use crate::env::Environment;
    use crate::flags::{Flag, FlagSet};

    /// A small server-style flag set: `host`, `port`, `debug`.
    pub fn server_flags() -> FlagSet {
        let mut flags = FlagSet::new("server");
        flags
            .add(Flag::string("host", "127.0.0.1", "Address to bind"))
            .unwrap();
        flags.add(Flag::int("port", 8080, "Port to listen on")).unwrap();
        flags.add(Flag::bool("debug", false, "Enable debug mode")).unwrap();
        flags
    }

    /// Flags `example1..example6` with the command line having set `example1`
    /// and `example6`.
    pub fn example_flags() -> FlagSet {
        let mut flags = FlagSet::new("example");
        for (name, default, usage) in [
            ("example1", "", "Example flag 1"),
            ("example2", "", "Example flag 2"),
            ("example3", "", "Example flag 3"),
            ("example4", "default will be overridden", "Example flag 4"),
            ("example5", "from default value", "Example flag 5"),
            ("example6", "", "Example flag 6"),
        ] {
            flags.add(Flag::string(name, default, usage)).unwrap();
        }
        flags.set("example1", "from command line").unwrap();
        flags.set("example6", "will override config file").unwrap();
        flags
    }

    pub fn example_env() -> Environment {
        Environment::empty()
            .with("EXAMPLE1", "flag will take precedence")
            .with("EXAMPLE2", "from env var as flag is not set")
            .with("EXAMPLE3", "env var overrides config file")
    }

    pub const EXAMPLE_YAML: &str = "\
example3: from config file (should be overridden)
example4: from config file
example6: from config file (should be overridden)
";

    #[test]
    fn example_flags_record_command_line() {
        let flags = example_flags();
        assert!(flags.changed("example1"));
        assert!(flags.changed("example6"));
        assert!(!flags.changed("example4"));
        assert_eq!(flags.get("example5"), Some("from default value"));
    }
}
