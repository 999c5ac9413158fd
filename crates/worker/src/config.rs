use relik_clamav::ClamavSettings;

/// Worker configuration loaded from environment variables.
///
/// All fields have defaults matching a stock ClamAV package install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub clamav: ClamavSettings,
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                        | Default                                   |
    /// |--------------------------------|-------------------------------------------|
    /// | `CLAMSCAN_BIN`                 | `clamscan`                                |
    /// | `FRESHCLAM_BIN`                | `freshclam`                               |
    /// | `CLAMAV_DEFAULT_DATABASE_PATHS`| `/var/lib/clamav,/usr/local/share/clamav` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ClamavSettings::default();

        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let clamscan_bin = non_blank("CLAMSCAN_BIN").unwrap_or(defaults.clamscan_bin);
        let freshclam_bin = non_blank("FRESHCLAM_BIN").unwrap_or(defaults.freshclam_bin);

        let default_database_paths = non_blank("CLAMAV_DEFAULT_DATABASE_PATHS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.default_database_paths);

        Self {
            clamav: ClamavSettings {
                clamscan_bin,
                freshclam_bin,
                default_database_paths,
            },
        }
    }
}
