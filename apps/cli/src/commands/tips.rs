//! "Did you know?" facts and green tips shown at session start.

use rand::seq::SliceRandom;
use rand::Rng;

const FACTS: [&str; 4] = [
    "It would take 45 billion trees a whole year to absorb 1 billion tonnes of CO₂.",
    "1 billion people flying from New York to London equals 500 million tonnes of CO₂.",
    "The average car emits about 4.6 metric tonnes of CO₂ per year.",
    "Heating and cooling buildings accounts for about 50% of global energy use.",
];

const TIPS: [&str; 8] = [
    "Switch off lights and electronics when not in use.",
    "Walk, cycle, or carpool whenever possible.",
    "Reduce, reuse, and recycle.",
    "Compost food scraps to reduce landfill emissions.",
    "Bring your own reusable bag when shopping.",
    "Fix leaking taps to save thousands of liters of water yearly.",
    "Choose more plant-based meals to lower your carbon footprint.",
    "Use rechargeable batteries whenever possible.",
];

/// `(heading, message)`, picking a fact or a tip with equal odds.
pub fn random_message<R: Rng>(rng: &mut R) -> (&'static str, &'static str) {
    if rng.gen_bool(0.5) {
        ("Did you know?", FACTS.choose(rng).copied().unwrap_or(FACTS[0]))
    } else {
        ("Green tip of the day:", TIPS.choose(rng).copied().unwrap_or(TIPS[0]))
    }
}
