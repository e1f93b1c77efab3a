use crate::environment::{Context, Zone};

/// Zone and context a request is scoped to. Both optional; an absent zone
/// falls back to the environment's default for authorization, but only an
/// explicit zone or context is encoded into the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub zone: Option<Zone>,
    pub context: Option<Context>,
}

impl Scope {
    pub fn zone(zone: Zone) -> Self {
        Self {
            zone: Some(zone),
            context: None,
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// `;zoneId=..;contextId=..` for whichever of the two is set.
    pub fn matrix_params(&self) -> String {
        let mut params = String::new();
        if let Some(zone) = &self.zone {
            params.push_str(";zoneId=");
            params.push_str(&zone.id);
        }
        if let Some(context) = &self.context {
            params.push_str(";contextId=");
            params.push_str(&context.id);
        }
        params
    }
}

/// `{base}/{name}s{matrix}`
pub(crate) fn collection_url(base: &str, name: &str, scope: &Scope) -> String {
    format!("{base}/{name}s{}", scope.matrix_params())
}

/// `{base}/{name}s/{id}{matrix}`
pub(crate) fn item_url(base: &str, name: &str, id: &str, scope: &Scope) -> String {
    format!("{base}/{name}s/{id}{}", scope.matrix_params())
}

/// `{base}/{name}s/{id}/phases/{phase}{matrix}`
pub(crate) fn phase_url(base: &str, name: &str, id: &str, phase: &str, scope: &Scope) -> String {
    format!("{base}/{name}s/{id}/phases/{phase}{}", scope.matrix_params())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:9000/api/services";

    #[test]
    fn default_scope_has_no_matrix_params() {
        assert_eq!(Scope::default().matrix_params(), "");
        assert_eq!(
            collection_url(BASE, "grading", &Scope::default()),
            "http://localhost:9000/api/services/gradings"
        );
    }

    #[test]
    fn zone_and_context_are_encoded_in_order() {
        let scope = Scope::zone(Zone::new("school")).with_context(Context::new("TERM1"));
        assert_eq!(scope.matrix_params(), ";zoneId=school;contextId=TERM1");
        assert_eq!(
            item_url(BASE, "grading", "abc-123", &scope),
            "http://localhost:9000/api/services/gradings/abc-123;zoneId=school;contextId=TERM1"
        );
    }

    #[test]
    fn context_without_zone() {
        let scope = Scope {
            zone: None,
            context: Some(Context::new("TERM1")),
        };
        assert_eq!(scope.matrix_params(), ";contextId=TERM1");
    }

    #[test]
    fn phase_url_shape() {
        let scope = Scope::zone(Zone::new("school"));
        assert_eq!(
            phase_url(BASE, "grading", "abc-123", "upload", &scope),
            "http://localhost:9000/api/services/gradings/abc-123/phases/upload;zoneId=school"
        );
    }
}
