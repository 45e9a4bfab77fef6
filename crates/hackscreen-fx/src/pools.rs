#![forbid(unsafe_code)]

//! Bundled text and value pools.
//!
//! Every piece of flavour text the effects print comes from a named pool.
//! Pools are loaded once at startup, either from the copies compiled into
//! the binary or from an assets directory with the same layout:
//!
//! ```text
//! ips.json  files.json  passwords.json  ...      JSON string arrays
//! ports.json                                     JSON integer array
//! phase_messages.json                            { "recon": [...], ... }
//! signal_profiles.json  system_info.json         structured records
//! banner.txt  skulls/*.txt                       ASCII art
//! ```
//!
//! A missing file, malformed JSON or an empty pool is a packaging defect
//! and fails the load with a [`ContentError`]; nothing is substituted.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;

/// Failure to load or address bundled content.
#[derive(Debug)]
pub enum ContentError {
    /// An asset file could not be read.
    Missing { file: String, source: io::Error },
    /// An asset file is not the JSON shape it should be.
    Malformed {
        file: String,
        source: serde_json::Error,
    },
    /// A pool loaded with no entries.
    EmptyPool(&'static str),
    /// A category name that does not exist.
    UnknownCategory(String),
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { file, source } => write!(f, "missing asset {file}: {source}"),
            Self::Malformed { file, source } => write!(f, "malformed asset {file}: {source}"),
            Self::EmptyPool(name) => write!(f, "data pool '{name}' is empty"),
            Self::UnknownCategory(name) => write!(f, "unknown data pool '{name}'"),
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Missing { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
            Self::EmptyPool(_) | Self::UnknownCategory(_) => None,
        }
    }
}

/// Named text pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Ips,
    Files,
    Passwords,
    HackingSteps,
    MalwareNames,
    TargetServers,
    EncryptionAlgos,
    NetworkProtocols,
    SystemProcesses,
    ErrorMessages,
    SuccessMessages,
    Recon,
    MalwareCleanup,
    ExfilTasks,
    Surveillance,
    FirewallBypass,
    FirewallSteps,
    SocialEngineering,
    SocialSteps,
    Cleanup,
    CleanupSteps,
    Skulls,
}

/// Where a category's entries live.
enum Origin {
    /// A JSON string array file.
    List(&'static str),
    /// A key of `phase_messages.json`.
    PhaseMessages(&'static str),
    /// One entry per `skulls/*.txt` file.
    SkullDir,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 22] = [
        Self::Ips,
        Self::Files,
        Self::Passwords,
        Self::HackingSteps,
        Self::MalwareNames,
        Self::TargetServers,
        Self::EncryptionAlgos,
        Self::NetworkProtocols,
        Self::SystemProcesses,
        Self::ErrorMessages,
        Self::SuccessMessages,
        Self::Recon,
        Self::MalwareCleanup,
        Self::ExfilTasks,
        Self::Surveillance,
        Self::FirewallBypass,
        Self::FirewallSteps,
        Self::SocialEngineering,
        Self::SocialSteps,
        Self::Cleanup,
        Self::CleanupSteps,
        Self::Skulls,
    ];

    /// Stable name used in asset files and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ips => "ips",
            Self::Files => "files",
            Self::Passwords => "passwords",
            Self::HackingSteps => "hacking_steps",
            Self::MalwareNames => "malware_names",
            Self::TargetServers => "target_servers",
            Self::EncryptionAlgos => "encryption_algos",
            Self::NetworkProtocols => "network_protocols",
            Self::SystemProcesses => "system_processes",
            Self::ErrorMessages => "error_messages",
            Self::SuccessMessages => "success_messages",
            Self::Recon => "recon",
            Self::MalwareCleanup => "malware_cleanup",
            Self::ExfilTasks => "exfil_tasks",
            Self::Surveillance => "surveillance",
            Self::FirewallBypass => "firewall_bypass",
            Self::FirewallSteps => "firewall_steps",
            Self::SocialEngineering => "social_engineering",
            Self::SocialSteps => "social_steps",
            Self::Cleanup => "cleanup",
            Self::CleanupSteps => "cleanup_steps",
            Self::Skulls => "skulls",
        }
    }

    /// Resolve a category by name.
    pub fn from_name(name: &str) -> Result<Self, ContentError> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ContentError::UnknownCategory(name.to_string()))
    }

    fn origin(self) -> Origin {
        match self {
            Self::Ips => Origin::List("ips.json"),
            Self::Files => Origin::List("files.json"),
            Self::Passwords => Origin::List("passwords.json"),
            Self::HackingSteps => Origin::List("hacking_steps.json"),
            Self::MalwareNames => Origin::List("malware_names.json"),
            Self::TargetServers => Origin::List("target_servers.json"),
            Self::EncryptionAlgos => Origin::List("encryption_algos.json"),
            Self::NetworkProtocols => Origin::List("network_protocols.json"),
            Self::SystemProcesses => Origin::List("system_processes.json"),
            Self::ErrorMessages => Origin::List("error_messages.json"),
            Self::SuccessMessages => Origin::List("success_messages.json"),
            Self::Skulls => Origin::SkullDir,
            other => Origin::PhaseMessages(other.name()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label pair and wave parameters for the dual signal graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignalProfile {
    pub left_label: String,
    pub right_label: String,
    /// Columns the scan line moves per frame.
    pub scan_speed: f64,
    /// Oscillations per character.
    pub wave_freq: f64,
    /// Phase shift per frame.
    pub wave_speed: f64,
}

/// Hardware and OS choices for the system-intel table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SystemInfoPool {
    pub os: Vec<String>,
    pub cpu: Vec<String>,
    pub gpu: Vec<String>,
    pub ram_gb: Vec<u32>,
    pub disk: Vec<String>,
}

/// Where assets are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// Copies compiled into the binary.
    Bundled,
    /// A directory with the bundled layout.
    Dir(PathBuf),
}

mod bundled {
    pub const FILES: &[(&str, &str)] = &[
        ("ips.json", include_str!("../assets/ips.json")),
        ("files.json", include_str!("../assets/files.json")),
        ("passwords.json", include_str!("../assets/passwords.json")),
        ("hacking_steps.json", include_str!("../assets/hacking_steps.json")),
        ("malware_names.json", include_str!("../assets/malware_names.json")),
        ("target_servers.json", include_str!("../assets/target_servers.json")),
        ("encryption_algos.json", include_str!("../assets/encryption_algos.json")),
        ("network_protocols.json", include_str!("../assets/network_protocols.json")),
        ("ports.json", include_str!("../assets/ports.json")),
        ("system_processes.json", include_str!("../assets/system_processes.json")),
        ("error_messages.json", include_str!("../assets/error_messages.json")),
        ("success_messages.json", include_str!("../assets/success_messages.json")),
        ("system_info.json", include_str!("../assets/system_info.json")),
        ("phase_messages.json", include_str!("../assets/phase_messages.json")),
        ("signal_profiles.json", include_str!("../assets/signal_profiles.json")),
        ("banner.txt", include_str!("../assets/banner.txt")),
    ];

    pub const SKULLS: &[&str] = &[
        include_str!("../assets/skulls/skull_01.txt"),
        include_str!("../assets/skulls/skull_02.txt"),
        include_str!("../assets/skulls/skull_03.txt"),
    ];
}

impl AssetSource {
    fn read(&self, file: &str) -> Result<Cow<'static, str>, ContentError> {
        match self {
            Self::Bundled => bundled::FILES
                .iter()
                .find(|(name, _)| *name == file)
                .map(|(_, text)| Cow::Borrowed(*text))
                .ok_or_else(|| ContentError::Missing {
                    file: file.to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "not bundled"),
                }),
            Self::Dir(dir) => read_file(&dir.join(file)).map(Cow::Owned),
        }
    }

    fn skulls(&self) -> Result<Vec<String>, ContentError> {
        match self {
            Self::Bundled => Ok(bundled::SKULLS.iter().map(|s| s.to_string()).collect()),
            Self::Dir(dir) => {
                let skull_dir = dir.join("skulls");
                let entries = fs::read_dir(&skull_dir).map_err(|source| ContentError::Missing {
                    file: skull_dir.display().to_string(),
                    source,
                })?;
                let mut paths = Vec::new();
                for entry in entries {
                    let path = entry
                        .map_err(|source| ContentError::Missing {
                            file: skull_dir.display().to_string(),
                            source,
                        })?
                        .path();
                    if path.extension().is_some_and(|ext| ext == "txt") {
                        paths.push(path);
                    }
                }
                paths.sort();
                paths.iter().map(|p| read_file(p)).collect()
            }
        }
    }

    fn json<T: for<'de> Deserialize<'de>>(&self, file: &str) -> Result<T, ContentError> {
        let text = self.read(file)?;
        serde_json::from_str(&text).map_err(|source| ContentError::Malformed {
            file: file.to_string(),
            source,
        })
    }
}

fn read_file(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|source| ContentError::Missing {
        file: path.display().to_string(),
        source,
    })
}

/// All pools, validated non-empty.
#[derive(Debug, Clone)]
pub struct DataPools {
    text: BTreeMap<Category, Vec<String>>,
    ports: Vec<u16>,
    signal_profiles: Vec<SignalProfile>,
    system_info: SystemInfoPool,
    banner: String,
}

impl DataPools {
    /// Load the pools compiled into the binary.
    pub fn bundled() -> Result<Self, ContentError> {
        Self::load(&AssetSource::Bundled)
    }

    /// Load pools from an assets directory.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Result<Self, ContentError> {
        Self::load(&AssetSource::Dir(dir.into()))
    }

    /// Load and validate every pool from `source`.
    pub fn load(source: &AssetSource) -> Result<Self, ContentError> {
        let mut phase_messages: BTreeMap<String, Vec<String>> =
            source.json("phase_messages.json")?;
        let mut text = BTreeMap::new();
        for category in Category::ALL {
            let entries = match category.origin() {
                Origin::List(file) => source.json::<Vec<String>>(file)?,
                Origin::PhaseMessages(key) => phase_messages.remove(key).unwrap_or_default(),
                Origin::SkullDir => source.skulls()?,
            };
            if entries.is_empty() {
                return Err(ContentError::EmptyPool(category.name()));
            }
            text.insert(category, entries);
        }

        let ports: Vec<u16> = source.json("ports.json")?;
        let signal_profiles: Vec<SignalProfile> = source.json("signal_profiles.json")?;
        let system_info: SystemInfoPool = source.json("system_info.json")?;
        let banner = source.read("banner.txt")?.into_owned();

        require(!ports.is_empty(), "ports")?;
        require(!signal_profiles.is_empty(), "signal_profiles")?;
        require(!system_info.os.is_empty(), "system_info.os")?;
        require(!system_info.cpu.is_empty(), "system_info.cpu")?;
        require(!system_info.gpu.is_empty(), "system_info.gpu")?;
        require(!system_info.ram_gb.is_empty(), "system_info.ram_gb")?;
        require(!system_info.disk.is_empty(), "system_info.disk")?;
        require(!banner.trim().is_empty(), "banner")?;

        hackscreen_core::debug!(?source, categories = text.len(), "data pools loaded");
        Ok(Self {
            text,
            ports,
            signal_profiles,
            system_info,
            banner,
        })
    }

    /// All entries of `category`.
    pub fn entries(&self, category: Category) -> &[String] {
        self.text
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// One random entry of `category`.
    pub fn pick<R: Rng + ?Sized>(&self, category: Category, rng: &mut R) -> &str {
        self.entries(category)
            .choose(rng)
            .map_or("", String::as_str)
    }

    /// Up to `n` distinct random entries of `category` (clamped to the pool
    /// size), in random order.
    pub fn sample<R: Rng + ?Sized>(&self, category: Category, n: usize, rng: &mut R) -> Vec<&str> {
        self.entries(category)
            .choose_multiple(rng, n)
            .map(String::as_str)
            .collect()
    }

    /// Port numbers for scans and `%PORT%` substitution.
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// One random port.
    pub fn pick_port<R: Rng + ?Sized>(&self, rng: &mut R) -> u16 {
        self.ports.choose(rng).copied().unwrap_or(443)
    }

    /// Signal-graph profiles.
    pub fn signal_profiles(&self) -> &[SignalProfile] {
        &self.signal_profiles
    }

    /// One random signal profile.
    pub fn pick_signal_profile<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SignalProfile> {
        self.signal_profiles.choose(rng)
    }

    /// Hardware choices.
    pub fn system_info(&self) -> &SystemInfoPool {
        &self.system_info
    }

    /// The welcome banner art.
    pub fn banner(&self) -> &str {
        &self.banner
    }
}

fn require(ok: bool, name: &'static str) -> Result<(), ContentError> {
    if ok {
        Ok(())
    } else {
        Err(ContentError::EmptyPool(name))
    }
}

/// A random dotted-quad address with every octet in `1..=254`.
pub fn random_ip<R: Rng + ?Sized>(rng: &mut R) -> String {
    let o: [u8; 4] = std::array::from_fn(|_| rng.random_range(1..=254));
    format!("{}.{}.{}.{}", o[0], o[1], o[2], o[3])
}

/// A random lowercase MAC address.
pub fn random_mac<R: Rng + ?Sized>(rng: &mut R) -> String {
    let o: [u8; 6] = std::array::from_fn(|_| rng.random());
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        o[0], o[1], o[2], o[3], o[4], o[5]
    )
}

/// `len` random lowercase hex digits.
pub fn random_hex<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    (0..len)
        .map(|_| DIGITS[rng.random_range(0..16)] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn pools() -> DataPools {
        DataPools::bundled().expect("bundled pools load")
    }

    #[test]
    fn bundled_pools_are_complete() {
        let pools = pools();
        for category in Category::ALL {
            assert!(!pools.entries(category).is_empty(), "{category} is empty");
        }
        assert!(!pools.ports().is_empty());
        assert!(!pools.signal_profiles().is_empty());
        assert!(pools.banner().contains('_'));
        assert_eq!(pools.entries(Category::Skulls).len(), 3);
    }

    #[test]
    fn category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.name()).ok(), Some(category));
        }
        assert!(matches!(
            Category::from_name("nope"),
            Err(ContentError::UnknownCategory(name)) if name == "nope"
        ));
    }

    #[test]
    fn sample_never_repeats_and_clamps() {
        let pools = pools();
        let mut rng = StdRng::seed_from_u64(9);
        let all = pools.entries(Category::Passwords).len();
        let picked = pools.sample(Category::Passwords, all + 10, &mut rng);
        assert_eq!(picked.len(), all);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), all);
        assert_eq!(pools.sample(Category::Passwords, 0, &mut rng).len(), 0);
    }

    #[test]
    fn pick_comes_from_pool() {
        let pools = pools();
        let mut rng = StdRng::seed_from_u64(10);
        for _ in 0..50 {
            let ip = pools.pick(Category::Ips, &mut rng);
            assert!(pools.entries(Category::Ips).iter().any(|e| e == ip));
        }
        assert!(pools.ports().contains(&pools.pick_port(&mut rng)));
    }

    #[test]
    fn firewall_steps_mention_ports() {
        let pools = pools();
        assert!(
            pools
                .entries(Category::FirewallSteps)
                .iter()
                .any(|s| s.contains("%PORT%"))
        );
    }

    #[test]
    fn generated_values_have_expected_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        let ip = random_ip(&mut rng);
        let octets: Vec<u8> = ip.split('.').filter_map(|o| o.parse().ok()).collect();
        assert_eq!(octets.len(), 4);
        assert!(octets.iter().all(|&o| (1..=254).contains(&o)));

        let mac = random_mac(&mut rng);
        assert_eq!(mac.len(), 17);
        assert_eq!(mac.matches(':').count(), 5);

        let hex = random_hex(&mut rng, 64);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn missing_directory_is_reported() {
        let err = DataPools::from_dir("/definitely/not/here").expect_err("must fail");
        assert!(matches!(err, ContentError::Missing { .. }));
    }

    /// An assets directory holding the bundled content.
    fn assets_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, text) in bundled::FILES {
            fs::write(dir.path().join(name), text).expect("write asset");
        }
        let skulls = dir.path().join("skulls");
        fs::create_dir(&skulls).expect("skull dir");
        for (i, art) in bundled::SKULLS.iter().enumerate() {
            fs::write(skulls.join(format!("skull_{:02}.txt", i + 1)), art).expect("write skull");
        }
        dir
    }

    #[test]
    fn directory_copy_loads_like_bundled() {
        let dir = assets_dir();
        let loaded = DataPools::from_dir(dir.path()).expect("directory pools load");
        let bundled = pools();
        for category in Category::ALL {
            assert_eq!(loaded.entries(category), bundled.entries(category));
        }
        assert_eq!(loaded.ports(), bundled.ports());
    }

    #[test]
    fn empty_list_is_fatal() {
        let dir = assets_dir();
        fs::write(dir.path().join("passwords.json"), "[]").expect("write");
        let err = DataPools::from_dir(dir.path()).expect_err("must fail");
        assert!(matches!(err, ContentError::EmptyPool("passwords")), "{err}");
    }

    #[test]
    fn malformed_json_is_fatal() {
        let dir = assets_dir();
        fs::write(dir.path().join("ports.json"), "[22, 80,").expect("write");
        let err = DataPools::from_dir(dir.path()).expect_err("must fail");
        assert!(
            matches!(&err, ContentError::Malformed { file, .. } if file == "ports.json"),
            "{err}"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_phase_messages_are_fatal() {
        let dir = assets_dir();
        fs::write(dir.path().join("phase_messages.json"), "{}").expect("write");
        let err = DataPools::from_dir(dir.path()).expect_err("must fail");
        assert!(matches!(err, ContentError::EmptyPool("recon")), "{err}");
    }

    #[test]
    fn empty_skull_directory_is_fatal() {
        let dir = assets_dir();
        let skulls = dir.path().join("skulls");
        fs::remove_dir_all(&skulls).expect("remove skulls");
        fs::create_dir(&skulls).expect("recreate skulls");
        let err = DataPools::from_dir(dir.path()).expect_err("must fail");
        assert!(matches!(err, ContentError::EmptyPool("skulls")), "{err}");
    }
}
