// Opaque, process-unique identifiers.
//
// Each generated type owns its own counter, so ids of different kinds never need to be compared.
macro_rules! opaque_id {
  ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
    $(#[$meta])*
    #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub struct $name(u64);

    impl $name {
      /// Allocate a fresh identifier, never returned before in this process.
      pub fn allocate() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};

        static NEXT: AtomicU64 = AtomicU64::new(1);
        $name(NEXT.fetch_add(1, Ordering::Relaxed))
      }

      /// Raw value of the identifier.
      pub fn raw(self) -> u64 {
        self.0
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, concat!($prefix, "#{}"), self.0)
      }
    }
  };
}
