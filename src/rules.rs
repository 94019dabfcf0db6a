//! Window rules: substring match on `WM_CLASS`/title against the compiled
//! `RULES` table (dwm.c `applyrules`, spec §5).

use crate::config::{Rule, RULES};

/// The subset of ICCCM window identity `manage()` has in hand by the time
/// rules are applied.
#[derive(Debug, Clone, Default)]
pub struct WindowIdentity {
    pub class: String,
    pub instance: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleMatch {
    pub tags: u32,
    pub is_floating: bool,
    pub monitor: i32,
}

fn matches(rule: &Rule, id: &WindowIdentity) -> bool {
    let class_ok = rule.class.is_empty() || id.class.contains(rule.class);
    let instance_ok = rule.instance.is_empty() || id.instance.contains(rule.instance);
    let title_ok = rule.title.is_empty() || id.title.contains(rule.title);
    class_ok && instance_ok && title_ok
}

/// Apply the first matching rule in table order, stopping there (spec §4.2).
pub fn apply(id: &WindowIdentity) -> RuleMatch {
    for rule in RULES.iter() {
        if matches(rule, id) {
            return RuleMatch { tags: rule.tags, is_floating: rule.is_floating, monitor: rule.monitor };
        }
    }
    RuleMatch { tags: 0, is_floating: false, monitor: -1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_class_sets_floating() {
        let id = WindowIdentity { class: "Gimp".into(), instance: String::new(), title: String::new() };
        let m = apply(&id);
        assert!(m.is_floating);
    }

    #[test]
    fn unmatched_window_gets_no_tag_override() {
        let id = WindowIdentity { class: "Xterm".into(), instance: String::new(), title: String::new() };
        let m = apply(&id);
        assert_eq!(m.tags, 0);
        assert!(!m.is_floating);
        assert_eq!(m.monitor, -1);
    }

    #[test]
    fn substring_match_is_not_exact_equality() {
        let id = WindowIdentity { class: "FirefoxESR".into(), instance: String::new(), title: String::new() };
        let m = apply(&id);
        assert_eq!(m.tags, 1 << 8);
    }
}
