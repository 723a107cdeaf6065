use axum::http::Method;
use common_auth::Role;

/// Authorization classification for a matched route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    RoleRestricted(Role),
}

/// One (method, path-prefix) rule. A rule without a method filter matches
/// every method.
#[derive(Debug, Clone)]
pub struct RouteRule {
    method: Option<Method>,
    prefix: String,
    access: Access,
}

impl RouteRule {
    pub fn new(method: Method, prefix: impl Into<String>, access: Access) -> Self {
        Self {
            method: Some(method),
            prefix: prefix.into(),
            access,
        }
    }

    pub fn any_method(prefix: impl Into<String>, access: Access) -> Self {
        Self {
            method: None,
            prefix: prefix.into(),
            access,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && path.starts_with(&self.prefix)
    }
}

/// Static rule table, built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Most specific prefix wins; the stable sort keeps declaration order
    /// for equal prefix lengths.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        let mut rules = rules;
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { rules }
    }

    /// Unmatched traffic fails closed: any valid token required.
    pub fn classify(&self, method: &Method, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.access)
            .unwrap_or(Access::Authenticated)
    }

    /// The storefront's standing rules: auth endpoints open, catalog reads
    /// open, catalog writes admin-only.
    pub fn standard() -> Self {
        Self::new(vec![
            RouteRule::any_method("/auth/", Access::Public),
            RouteRule::new(Method::GET, "/products", Access::Public),
            RouteRule::new(Method::POST, "/products", Access::RoleRestricted(Role::Admin)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_classifies_known_routes() {
        let table = RouteTable::standard();

        assert_eq!(table.classify(&Method::POST, "/auth/login"), Access::Public);
        assert_eq!(table.classify(&Method::GET, "/auth/validate"), Access::Public);
        assert_eq!(table.classify(&Method::GET, "/products"), Access::Public);
        assert_eq!(table.classify(&Method::GET, "/products/42"), Access::Public);
        assert_eq!(
            table.classify(&Method::POST, "/products"),
            Access::RoleRestricted(Role::Admin)
        );
    }

    #[test]
    fn unmatched_method_or_path_defaults_to_authenticated() {
        let table = RouteTable::standard();

        // Method filters keep catalog writes out of the public GET rule.
        assert_eq!(table.classify(&Method::PUT, "/products/42"), Access::Authenticated);
        assert_eq!(table.classify(&Method::DELETE, "/products/42"), Access::Authenticated);
        // Paths the table has never heard of.
        assert_eq!(table.classify(&Method::GET, "/orders"), Access::Authenticated);
        assert_eq!(table.classify(&Method::GET, "/"), Access::Authenticated);
    }

    #[test]
    fn longest_prefix_wins() {
        let table = RouteTable::new(vec![
            RouteRule::any_method("/api/", Access::Authenticated),
            RouteRule::any_method("/api/public/", Access::Public),
        ]);

        assert_eq!(table.classify(&Method::GET, "/api/public/info"), Access::Public);
        assert_eq!(table.classify(&Method::GET, "/api/private"), Access::Authenticated);
    }

    #[test]
    fn equal_prefixes_resolve_by_declaration_order() {
        let table = RouteTable::new(vec![
            RouteRule::new(Method::GET, "/things", Access::Public),
            RouteRule::any_method("/things", Access::Authenticated),
        ]);

        // First declared rule wins for GET; the catch-all covers the rest.
        assert_eq!(table.classify(&Method::GET, "/things"), Access::Public);
        assert_eq!(table.classify(&Method::POST, "/things"), Access::Authenticated);
    }
}
