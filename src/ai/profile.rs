//! Compiled behavior profiles.

use std::collections::HashMap;

use rhai::{AST, Dynamic, Engine, Map, Scope};
use tracing::debug;

use super::api::as_number;
use crate::error::ProfileError;

/// Routine every profile must define.
pub(crate) const CONTROL_ROUTINE: &str = "control";

/// Index of a loaded profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProfileId(pub usize);

/// One compiled behavior program, shared by every actor flying it.
#[derive(Debug, Clone)]
pub struct Profile {
    name: String,
    ast: AST,
    memory: Map,
    control_rate: f64,
    routines: HashMap<String, usize>,
}

impl Profile {
    /// Compile `source` and evaluate its top-level statements once to read
    /// the `memory` template and `control_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] when the script does not parse, its top level
    /// fails, `memory` is not a map, `control_rate` is not a positive number
    /// or there is no `control` routine.
    pub(crate) fn compile(engine: &Engine, name: &str, source: &str, default_control_rate: f64) -> Result<Self, ProfileError> {
        let ast = engine.compile(source).map_err(|e| ProfileError::Compile {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        let mut scope = Scope::new();
        engine.run_ast_with_scope(&mut scope, &ast).map_err(|e| ProfileError::Init {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        let memory = match scope.get_value::<Dynamic>("memory") {
            None => Map::new(),
            Some(value) => value.try_cast::<Map>().ok_or_else(|| ProfileError::MalformedMemory(name.to_string()))?,
        };

        let control_rate = match scope.get_value::<Dynamic>("control_rate") {
            None => default_control_rate,
            Some(value) => as_number(&value)
                .filter(|rate| rate.is_finite() && *rate > 0.0)
                .ok_or_else(|| ProfileError::InvalidControlRate(name.to_string()))?,
        };

        let mut routines = HashMap::new();
        for f in ast.iter_functions() {
            let arity = routines.entry(f.name.to_string()).or_insert(0);
            *arity = (*arity).max(f.params.len());
        }
        if !routines.contains_key(CONTROL_ROUTINE) {
            return Err(ProfileError::MissingControl(name.to_string()));
        }

        debug!(profile = name, routines = routines.len(), control_rate, "profile_compiled");
        Ok(Self {
            name: name.to_string(),
            ast,
            memory,
            control_rate,
            routines,
        })
    }

    /// Profile name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled program.
    #[must_use]
    pub fn ast(&self) -> &AST {
        &self.ast
    }

    /// Default memory every actor's record starts from.
    #[must_use]
    pub fn memory_template(&self) -> &Map {
        &self.memory
    }

    /// Seconds between two `control` runs.
    #[must_use]
    pub fn control_rate(&self) -> f64 {
        self.control_rate
    }

    /// Whether the profile defines `routine`.
    #[must_use]
    pub fn has_routine(&self, routine: &str) -> bool {
        self.routines.contains_key(routine)
    }

    /// Parameter count of `routine`.
    #[must_use]
    pub fn arity(&self, routine: &str) -> Option<usize> {
        self.routines.get(routine).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> Result<Profile, ProfileError> {
        Profile::compile(&Engine::new(), "test", source, 2.0)
    }

    #[test]
    fn test_reads_globals_and_routines() {
        let profile = compile(
            r#"
            let control_rate = 0.5;
            let memory = #{ aggressive: true, home: "Ophelia" };
            fn control() {}
            fn attacked(attacker) {}
            "#,
        )
        .unwrap();
        assert_eq!(profile.name(), "test");
        assert!((profile.control_rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(profile.memory_template().len(), 2);
        assert_eq!(profile.arity("attacked"), Some(1));
        assert!(profile.has_routine("control"));
        assert!(!profile.has_routine("distress"));
    }

    #[test]
    fn test_defaults_without_globals() {
        let profile = compile("fn control() {}").unwrap();
        assert!((profile.control_rate() - 2.0).abs() < f64::EPSILON);
        assert!(profile.memory_template().is_empty());
    }

    #[test]
    fn test_integer_control_rate_accepted() {
        let profile = compile("let control_rate = 3; fn control() {}").unwrap();
        assert!((profile.control_rate() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_bad_profiles() {
        assert!(matches!(compile("fn control( {"), Err(ProfileError::Compile { .. })));
        assert!(matches!(compile("let x = 1 / 0; fn control() {}"), Err(ProfileError::Init { .. })));
        assert!(matches!(compile("let memory = 4; fn control() {}"), Err(ProfileError::MalformedMemory(_))));
        assert!(matches!(compile("let control_rate = 0; fn control() {}"), Err(ProfileError::InvalidControlRate(_))));
        assert!(matches!(compile(r#"let control_rate = "fast"; fn control() {}"#), Err(ProfileError::InvalidControlRate(_))));
        assert!(matches!(compile("fn idle() {}"), Err(ProfileError::MissingControl(_))));
    }
}
