/// The shape of a router a dispatch benchmark runs against.
#[derive(Debug, Copy, Clone)]
pub struct DispatchCase {
    name: &'static str,
    group: DispatchGroup,
    layers: usize,
    target: Target,
}

impl DispatchCase {
    pub fn new(name: &'static str, group: DispatchGroup, layers: usize, target: Target) -> Self {
        Self { name, group, layers, target }
    }

    pub fn direct(name: &'static str, layers: usize, target: Target) -> Self {
        Self::new(name, DispatchGroup::Direct, layers, target)
    }

    pub fn mounted(name: &'static str, layers: usize, target: Target) -> Self {
        Self::new(name, DispatchGroup::Mounted, layers, target)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> DispatchGroup {
        self.group
    }

    /// Number of layers registered before the target layer.
    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn target(&self) -> Target {
        self.target
    }
}

/// Where a request ends up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Target {
    /// A layer after every filler layer ends the chain.
    LastLayer,
    /// Every layer passes control on and nothing ends the chain.
    Exhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchGroup {
    /// Layers registered on the router itself.
    Direct,
    /// The same layers spliced in from a sub-router under a path prefix.
    Mounted,
}
