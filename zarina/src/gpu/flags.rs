use std::fmt;

use super::probe::CapabilityTier;

const BASELINE: &[&str] = &[
    "enable-accelerated-2d-canvas",
    "enable-webgl2-compute-context",
    "enable-quic",
    "disable-http2",
    "disable-background-timer-throttling",
    "disable-renderer-backgrounding",
    "disable-backgrounding-occluded-windows",
    "disable-ipc-flooding-protection",
    "enable-oop-rasterization",
    "enable-checker-imaging",
    "enable-experimental-web-platform-features",
];

const DISCRETE: &[&str] = &[
    "force_high_performance_gpu",
    "enable-gpu-rasterization",
    "enable-native-gpu-memory-buffers",
    "disable-software-rasterizer",
    "ignore-gpu-blacklist",
    "enable-zero-copy",
];

const INTEGRATED: &[&str] = &[
    "enable-low-end-device-mode",
    "disable-accelerated-video-decode",
    "disable-accelerated-2d-canvas",
];

const SOFTWARE: &[&str] = &["disable-gpu", "disable-gpu-compositing"];

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Flag {
    pub name: String,
    pub value: Option<String>,
}

impl Flag {
    pub fn switch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "--{}={}", self.name, value),
            None => write!(f, "--{}", self.name),
        }
    }
}

/// Ordered, append-only collection of engine switches. Appending a flag that
/// is already present is a no-op.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, flag: Flag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    pub fn append_switch(&mut self, name: &str) {
        self.append(Flag::switch(name));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.iter().any(|flag| flag.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Resolves `enable-<feature>` against `disable-<feature>`; whichever was
    /// appended last wins. `None` when neither is present.
    pub fn effective(&self, feature: &str) -> Option<bool> {
        let enable = format!("enable-{}", feature);
        let disable = format!("disable-{}", feature);

        self.flags.iter().rev().find_map(|flag| {
            if flag.name == enable {
                Some(true)
            } else if flag.name == disable {
                Some(false)
            } else {
                None
            }
        })
    }

    pub fn to_browser_args(&self) -> String {
        self.flags
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a Flag;
    type IntoIter = std::slice::Iter<'a, Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.iter()
    }
}

pub fn baseline() -> FlagSet {
    let mut flags = FlagSet::new();
    for name in BASELINE {
        flags.append_switch(name);
    }
    flags
}

pub fn flags_for(tier: CapabilityTier) -> FlagSet {
    let mut flags = baseline();

    let additions = match tier {
        CapabilityTier::Discrete => DISCRETE,
        CapabilityTier::Integrated => INTEGRATED,
        CapabilityTier::None => SOFTWARE,
    };

    for name in additions {
        flags.append_switch(name);
    }

    flags
}

/// A flag set that has been committed for the lifetime of the process.
/// Web view construction borrows this, so a window cannot exist before the
/// flags it depends on have been decided.
#[derive(Debug, Eq, PartialEq)]
pub struct RuntimeConfig {
    tier: CapabilityTier,
    flags: FlagSet,
    browser_args: String,
}

impl RuntimeConfig {
    pub fn commit(tier: CapabilityTier, flags: FlagSet) -> Self {
        let browser_args = flags.to_browser_args();
        Self {
            tier,
            flags,
            browser_args,
        }
    }

    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn browser_args(&self) -> &str {
        &self.browser_args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: [CapabilityTier; 3] = [
        CapabilityTier::Discrete,
        CapabilityTier::Integrated,
        CapabilityTier::None,
    ];

    #[test]
    fn flags_for_is_deterministic() {
        for tier in TIERS {
            assert_eq!(flags_for(tier), flags_for(tier));
        }
    }

    #[test]
    fn baseline_is_an_ordered_prefix_of_every_tier() {
        let base = baseline();
        for tier in TIERS {
            let flags = flags_for(tier);
            let prefix: Vec<_> = flags.iter().take(base.len()).collect();
            let expected: Vec<_> = base.iter().collect();
            assert_eq!(prefix, expected, "tier {:?}", tier);
        }
    }

    #[test]
    fn tier_flags_are_additive() {
        assert_eq!(
            flags_for(CapabilityTier::Discrete).len(),
            BASELINE.len() + DISCRETE.len()
        );
        assert_eq!(
            flags_for(CapabilityTier::Integrated).len(),
            BASELINE.len() + INTEGRATED.len()
        );
        assert_eq!(
            flags_for(CapabilityTier::None).len(),
            BASELINE.len() + SOFTWARE.len()
        );
    }

    #[test]
    fn integrated_disables_accelerated_canvas() {
        let flags = flags_for(CapabilityTier::Integrated);
        assert!(flags.contains("enable-accelerated-2d-canvas"));
        assert_eq!(flags.effective("accelerated-2d-canvas"), Some(false));
    }

    #[test]
    fn other_tiers_keep_accelerated_canvas() {
        for tier in [CapabilityTier::Discrete, CapabilityTier::None] {
            let flags = flags_for(tier);
            assert_eq!(flags.effective("accelerated-2d-canvas"), Some(true));
        }
    }

    #[test]
    fn discrete_forces_high_performance_gpu() {
        let flags = flags_for(CapabilityTier::Discrete);
        assert!(flags.contains("force_high_performance_gpu"));
        assert!(!flags.contains("disable-gpu"));
    }

    #[test]
    fn none_tier_disables_gpu() {
        let flags = flags_for(CapabilityTier::None);
        assert!(flags.contains("disable-gpu"));
        assert!(flags.contains("disable-gpu-compositing"));
        assert!(!flags.contains("enable-gpu-rasterization"));
    }

    fn valued(name: &str, value: &str) -> Flag {
        Flag {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    #[test]
    fn duplicate_append_is_a_no_op() {
        let mut flags = FlagSet::new();
        assert!(flags.is_empty());
        flags.append_switch("enable-quic");
        flags.append_switch("enable-quic");
        flags.append(valued("js-flags", "--expose-gc"));
        flags.append(valued("js-flags", "--expose-gc"));
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn effective_is_none_for_untouched_feature() {
        let flags = flags_for(CapabilityTier::Discrete);
        assert_eq!(flags.effective("accelerated-video-decode"), None);
    }

    #[test]
    fn browser_args_render_in_order() {
        let mut flags = FlagSet::new();
        flags.append_switch("disable-gpu");
        flags.append(valued("force-device-scale-factor", "1"));
        assert_eq!(
            flags.to_browser_args(),
            "--disable-gpu --force-device-scale-factor=1"
        );
    }

    #[test]
    fn commit_captures_args_and_tier() {
        let config = RuntimeConfig::commit(
            CapabilityTier::None,
            flags_for(CapabilityTier::None),
        );
        assert_eq!(config.tier(), CapabilityTier::None);
        assert!(config.browser_args().starts_with("--enable-accelerated-2d"));
        assert!(config.browser_args().ends_with("--disable-gpu-compositing"));
    }
}
