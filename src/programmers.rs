//! Device backend registration
//!
//! This module lists the backends enabled at compile time and parses
//! backend strings of the form `name:key=value,...`.

/// Information about a device backend
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "spidev")]
    programmers.push(ProgrammerInfo {
        name: "spidev",
        aliases: &["spi2pll", "linux_spi"],
        description: "spi2pll_lxm2582 character device (dev=/dev/spi_3wires_lxm2582)",
    });

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &["dry-run"],
        description: "Records writes in memory (fail_at=<index>,fail_open=<notfound|denied>,reported=<zero|full|N>)",
    });

    programmers
}

/// Generate help text listing all available backends
pub fn programmer_help() -> String {
    let programmers = available_programmers();

    if programmers.is_empty() {
        return "No device backends available (recompile with backend features enabled)"
            .to_string();
    }

    let mut help = String::from("Available device backends:\n");
    for p in &programmers {
        help.push_str(&format!("  {:8} - {}\n", p.name, p.description));
        if !p.aliases.is_empty() {
            help.push_str(&format!("  {:8}   aliases: {}\n", "", p.aliases.join(", ")));
        }
    }

    help
}

/// Generate a short list of backend names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Resolve a backend name or alias to its primary name
pub fn find_programmer(name: &str) -> Option<&'static str> {
    available_programmers()
        .into_iter()
        .find(|p| p.name == name || p.aliases.iter().any(|a| *a == name))
        .map(|p| p.name)
}

/// Parse a backend string into name and options
///
/// Format: "name", "name:option1=value1,option2=value2", or a bare device
/// path, which is shorthand for "spidev:dev=<path>". An option without `=`
/// is an error.
pub fn parse_programmer_string(s: &str) -> Result<(&str, Vec<(&str, &str)>), String> {
    if s.starts_with('/') {
        return Ok(("spidev", vec![("dev", s)]));
    }

    let Some((name, opts)) = s.split_once(':') else {
        return Ok((s, Vec::new()));
    };

    let options = opts
        .split(',')
        .map(|opt| {
            opt.split_once('=').ok_or_else(|| {
                format!(
                    "Malformed option '{}' for device backend {} (expected key=value)",
                    opt, name
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((name, options))
}

/// Error for a backend name that isn't compiled in
pub fn unknown_programmer_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown device backend: {}\n\n", name);
    msg.push_str(&programmer_help());
    msg.push_str("\nUse 'lmx2582ctl list-programmers' for more details");
    msg.into()
}
