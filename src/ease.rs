#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    OutCubic,
    /// Elastic snap-back with unit amplitude and a 0.75 period: overshoots
    /// the target and rings down to it. Used for the return to rest.
    OutElastic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::OutElastic => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                const PERIOD: f64 = 0.75;
                let shift = PERIOD / 4.0;
                (-10.0 * t).exp2() * ((t - shift) * std::f64::consts::TAU / PERIOD).sin() + 1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_stable() {
        for ease in [Ease::Linear, Ease::OutCubic, Ease::OutElastic] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
            assert_eq!(ease.apply(-3.0), 0.0);
            assert_eq!(ease.apply(7.0), 1.0);
        }
    }

    #[test]
    fn monotonic_spot_check() {
        for ease in [Ease::Linear, Ease::OutCubic] {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b);
            assert!(b < c);
        }
    }

    #[test]
    fn elastic_overshoots_then_settles() {
        // The first swing carries past the target...
        assert!(Ease::OutElastic.apply(0.3) > 1.0);
        // ...and the tail hugs it.
        let late = Ease::OutElastic.apply(0.95);
        assert!((late - 1.0).abs() < 0.01, "late value {late}");
    }
}
