use core::fmt;

use log::warn;

/// Upper bound on the number of services a bus may multiplex (§3: service
/// index is a 3-bit field).
pub const MAX_SERVICES: usize = 8;

/// Upper bound on sub-service indices (§3: 5-bit field).
pub const MAX_SUB_SERVICE: u8 = 31;

/// Largest legal `frameLengthMax` (§3: `length` is one wire byte).
pub const MAX_FRAME_LENGTH: u8 = 255;

/// Per-service configuration (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `true`: STREAM service (single-frame datagrams, no datagram
    /// checksum). `false`: DIAGNOSTICS service (fragmentable, checksummed).
    pub is_stream: bool,
    /// Minimum ticks between two consecutive transmitted frames on this
    /// service. `0` means unlimited.
    pub rate_limit: u16,
    /// Stream services only: when `true`, enqueuing a new datagram discards
    /// whatever was previously buffered and not yet picked up by the
    /// arbiter.
    pub only_tx_latest: bool,
}

impl ServiceConfig {
    /// A diagnostics service with no rate limit.
    pub const fn diagnostics(rate_limit: u16) -> Self {
        ServiceConfig {
            is_stream: false,
            rate_limit,
            only_tx_latest: false,
        }
    }

    /// A stream service.
    pub const fn stream(rate_limit: u16, only_tx_latest: bool) -> Self {
        ServiceConfig {
            is_stream: true,
            rate_limit,
            only_tx_latest,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            is_stream: false,
            rate_limit: 0,
            only_tx_latest: false,
        }
    }
}

/// Bus-wide, read-only-after-construction configuration (§3).
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Frame synchronisation byte. Never escaped; seeing it always means
    /// "a new frame starts here".
    pub start_frame: u8,
    /// Escape introducer byte.
    pub esc: u8,
    /// Byte following `esc` that decodes to `start_frame`.
    pub esc_start: u8,
    /// Byte following `esc` that decodes to `esc`.
    pub esc_esc: u8,
    /// Largest legal frame payload length, in `0..=255`.
    pub frame_length_max: u8,
    /// Largest legal datagram payload length; must be `>= frame_length_max`.
    pub datagram_length_max: u16,
    /// Number of services actually in use, in `1..=MAX_SERVICES`.
    pub service_count: u8,
    /// Per-service configuration; only the first `service_count` entries
    /// are meaningful.
    pub services: [ServiceConfig; MAX_SERVICES],
}

impl Config {
    /// SLIP-compatible defaults matching the reference implementation
    /// (§6): `0xC0/0xDB/0xDC/0xDD`.
    pub const DEFAULT_START_FRAME: u8 = 0xC0;
    pub const DEFAULT_ESC: u8 = 0xDB;
    pub const DEFAULT_ESC_START: u8 = 0xDC;
    pub const DEFAULT_ESC_ESC: u8 = 0xDD;

    /// Build a configuration using the reference framing bytes, given the
    /// frame/datagram size bounds and the active services (in priority
    /// order, index 0 highest).
    pub fn new(
        frame_length_max: u8,
        datagram_length_max: u16,
        services: &[ServiceConfig],
    ) -> Result<Self, ConfigError> {
        let mut table = [ServiceConfig::default(); MAX_SERVICES];
        let count = services.len();
        if count == 0 || count > MAX_SERVICES {
            return Err(ConfigError::ServiceCount(count));
        }
        table[..count].copy_from_slice(services);
        let cfg = Config {
            start_frame: Self::DEFAULT_START_FRAME,
            esc: Self::DEFAULT_ESC,
            esc_start: Self::DEFAULT_ESC_START,
            esc_esc: Self::DEFAULT_ESC_ESC,
            frame_length_max,
            datagram_length_max,
            service_count: count as u8,
            services: table,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Cross-field invariants §3 leaves implicit: framing bytes pairwise
    /// distinct, `datagram_length_max >= frame_length_max`, service count
    /// in range. Called from every constructor; not required again by the
    /// rest of the core, which trusts a validated `Config`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bytes = [self.start_frame, self.esc, self.esc_start, self.esc_esc];
        for i in 0..bytes.len() {
            for j in (i + 1)..bytes.len() {
                if bytes[i] == bytes[j] {
                    warn!("PRLSC config: framing bytes must be pairwise distinct");
                    return Err(ConfigError::FramingBytesNotDistinct);
                }
            }
        }
        if (self.datagram_length_max as u32) < self.frame_length_max as u32 {
            warn!("PRLSC config: datagramLengthMax must be >= frameLengthMax");
            return Err(ConfigError::DatagramShorterThanFrame);
        }
        let count = self.service_count as usize;
        if count == 0 || count > MAX_SERVICES {
            warn!("PRLSC config: serviceCount out of range: {count}");
            return Err(ConfigError::ServiceCount(count));
        }
        Ok(())
    }

    /// `true` if `index` names an active service.
    pub fn service_in_range(&self, index: u8) -> bool {
        (index as usize) < self.service_count as usize
    }
}

/// Error returned by [`Config::new`]/[`Config::validate`] (§10 — the
/// distilled spec never says who enforces these; this crate enforces them
/// once, at construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    FramingBytesNotDistinct,
    DatagramShorterThanFrame,
    ServiceCount(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FramingBytesNotDistinct => {
                write!(f, "startFrame/esc/escStart/escEsc must be pairwise distinct")
            }
            ConfigError::DatagramShorterThanFrame => {
                write!(f, "datagramLengthMax must be >= frameLengthMax")
            }
            ConfigError::ServiceCount(n) => {
                write!(f, "serviceCount {n} out of range 1..={MAX_SERVICES}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
