//! Seeded random streams for product selection, shuffling and basket sizing.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Per-mode RNG streams, each derived from the mode seed with its own domain tag.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    selection: CountingRng<SmallRng>,
    shuffle: CountingRng<SmallRng>,
    sizing: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a mode seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            selection: CountingRng::new(derive_stream_seed(seed, b"selection")),
            shuffle: CountingRng::new(derive_stream_seed(seed, b"shuffle")),
            sizing: CountingRng::new(derive_stream_seed(seed, b"sizing")),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws made across every stream, logged when a mode stops.
    #[must_use]
    pub const fn total_draws(&self) -> u64 {
        self.selection
            .draws()
            .saturating_add(self.shuffle.draws())
            .saturating_add(self.sizing.draws())
    }

    /// Stream used for product index selection.
    pub fn selection(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.selection
    }

    /// Stream used for card and product shuffles.
    pub fn shuffle(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.shuffle
    }

    /// Stream used for basket sizing.
    pub fn sizing(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.sizing
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).map_or(user_seed, |mut mac| {
        mac.update(domain_tag);
        let digest = mac.finalize().into_bytes();
        let mut seed_bytes = [0_u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(seed_bytes)
    })
}
