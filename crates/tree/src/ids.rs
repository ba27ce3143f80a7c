//! Id generation for component nodes.

/// Supplies ids for newly created component nodes.
pub trait IdGenerator {
    /// Returns an id not handed out before by this generator.
    fn next_id(&mut self) -> String;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> String,
{
    fn next_id(&mut self) -> String {
        (self)()
    }
}

/// Deterministic `"{prefix}-{n}"` ids, counting from 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    /// Creates a generator with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("component")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::new("c");
        assert_eq!(ids.next_id(), "c-1");
        assert_eq!(ids.next_id(), "c-2");
    }

    #[test]
    fn closures_are_generators() {
        let mut n = 0;
        let mut ids = || {
            n += 10;
            format!("id{n}")
        };
        assert_eq!(IdGenerator::next_id(&mut ids), "id10");
    }
}
