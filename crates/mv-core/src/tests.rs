//! Unit tests for mv-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EdgeId, NodeId, PathId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = PathId::fresh();
        let b = PathId::fresh();
        assert_ne!(a, b);
        assert_ne!(a, PathId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod point {
    use crate::{Point, normalize_heading};

    #[test]
    fn distance_is_planar() {
        let a = Point::with_z(0.0, 0.0, 5.0);
        let b = Point::with_z(3.0, 4.0, -5.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn offset_along_axes() {
        let p = Point::new(1.0, 1.0);
        let east = p.offset(0.0, 2.0);
        let south = p.offset(90.0, 2.0);
        assert!(east.approx_eq(Point::new(3.0, 1.0)));
        assert!((south.x - 1.0).abs() < 1e-12);
        assert!((south.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn lerp_interpolates_z() {
        let p = Point::with_z(0.0, 0.0, 0.0).lerp(Point::with_z(10.0, 0.0, 4.0), 0.25);
        assert_eq!(p, Point::with_z(2.5, 0.0, 1.0));
    }

    #[test]
    fn clamp_into_environment() {
        let p = Point::new(-1.0, 12.0).clamp_to(10.0, 10.0);
        assert_eq!(p, Point::new(0.0, 10.0));
    }

    #[test]
    fn heading_normalisation() {
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(450.0), 90.0);
        assert_eq!(normalize_heading(0.0), 0.0);
        let h = Point::new(0.0, 0.0).heading_to(Point::new(0.0, 1.0));
        assert!((h - 90.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            assert_eq!(r1.heading_offset(359.0), r2.heading_offset(359.0));
        }
    }

    #[test]
    fn heading_offset_in_bounds() {
        let mut rng = AgentRng::new(0, AgentId(3));
        for _ in 0..1000 {
            let v = rng.heading_offset(90.0);
            assert!((-45.0..=45.0).contains(&v), "got {v}");
        }
    }

    #[test]
    fn zero_amplitude_is_exact() {
        let mut rng = AgentRng::new(9, AgentId(1));
        for _ in 0..10 {
            assert_eq!(rng.heading_offset(0.0), 0.0);
        }
    }
}

#[cfg(test)]
mod error {
    use crate::MoveError;

    #[test]
    fn only_geometry_faults_are_fatal() {
        assert!(!MoveError::Unreachable.is_fatal());
        assert!(!MoveError::InvalidArgument("target".into()).is_fatal());
        assert!(!MoveError::Exhausted { rounds: 3 }.is_fatal());
        assert!(MoveError::GeometryFault("ring".into()).is_fatal());
    }
}

#[cfg(test)]
mod config {
    use crate::MoveConfig;

    #[test]
    fn defaults_validate() {
        let cfg = MoveConfig::default();
        assert_eq!(cfg.default_amplitude_deg, 359.0);
        assert_eq!(cfg.coarse_factor, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_cell_size() {
        let cfg = MoveConfig { grid_cell_size: 0.0, ..MoveConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = MoveConfig { env_width: -1.0, ..MoveConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_partial_document() {
        let cfg = MoveConfig::from_toml_str("env_width = 50.0\ntriangulation = true\n").unwrap();
        assert_eq!(cfg.env_width, 50.0);
        assert!(cfg.triangulation);
        assert_eq!(cfg.grid_cell_size, 1.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_file_roundtrip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "env_height = 20.0\nseed = 7").unwrap();
        let cfg = MoveConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.env_height, 20.0);
        assert_eq!(cfg.seed, 7);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_invalid_values_rejected() {
        assert!(MoveConfig::from_toml_str("grid_cell_size = -2.0").is_err());
    }
}
