//! Built-in lint rules

pub mod closures;
pub mod redundancy;

use crate::RuleRegistry;

/// Register every built-in rule. The order here is the execution and
/// reporting order.
pub fn register_builtin_rules(registry: &mut RuleRegistry) {
    registry.register(Box::new(redundancy::CombineConsecutiveIssets));
    registry.register(Box::new(closures::PreferArrowFunction));
    registry.register(Box::new(closures::PreferStaticClosure));
}
