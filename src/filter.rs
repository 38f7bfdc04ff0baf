/// Default TLS port watched when no other port is configured
pub const TLS_PORT: u16 = 443;

/// Port filter configuration
///
/// A TCP segment passes when either its source or destination port is listed,
/// or when the filter matches any port.
///
/// # Examples
///
/// ```rust
/// use ja3_fingerprint::PortFilter;
///
/// // Only 443 (the default)
/// let filter = PortFilter::default();
/// assert!(filter.matches(51000, 443));
///
/// // Extra ports
/// let filter = PortFilter::default().port_list(vec![8443, 993]);
/// assert!(filter.matches(993, 40000));
///
/// // Everything
/// let filter = PortFilter::default().any_port();
/// assert!(filter.matches(1, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortFilter {
    /// Ports to match on either side of the connection
    pub ports: Vec<u16>,
    /// Match every port
    pub any_port: bool,
}

impl Default for PortFilter {
    fn default() -> Self {
        Self { ports: vec![TLS_PORT], any_port: false }
    }
}

impl PortFilter {
    /// Create a filter matching no port at all
    pub fn new() -> Self {
        Self { ports: Vec::new(), any_port: false }
    }

    /// Add a port
    pub fn port(mut self, port: u16) -> Self {
        if !self.ports.contains(&port) {
            self.ports.push(port);
        }
        self
    }

    /// Add multiple ports
    pub fn port_list(self, ports: Vec<u16>) -> Self {
        ports.into_iter().fold(self, Self::port)
    }

    /// Look for ClientHellos on every port
    pub fn any_port(mut self) -> Self {
        self.any_port = true;
        self
    }

    /// Check a TCP source/destination port pair
    pub fn matches(&self, src_port: u16, dst_port: u16) -> bool {
        self.any_port || self.ports.contains(&src_port) || self.ports.contains(&dst_port)
    }
}
