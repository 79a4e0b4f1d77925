use crate::physics::{Particle, Position};

/// A connecting stroke between two particles that came within the connect
/// distance of each other this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub a: Position,
    pub b: Position,
    pub opacity: f32,
}

/// Computes the connecting strokes for the current particle positions.
///
/// Every unordered pair closer than `connect_distance` yields one link whose
/// opacity falls off linearly from `link_alpha` at distance zero to zero at
/// the threshold. O(N²) over the population; fine at the configured counts,
/// and the first thing to revisit if the population ever grows much past
/// them.
pub fn pairwise_links(particles: &[Particle], connect_distance: f32, link_alpha: f32) -> Vec<Link> {
    let mut links = Vec::new();
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            let distance = (a.position - b.position).norm();
            if distance < connect_distance {
                links.push(Link {
                    a: a.position,
                    b: b.position,
                    opacity: (1.0 - distance / connect_distance) * link_alpha,
                });
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Velocity;

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle {
            position: Position::new(x, y),
            velocity: Velocity::new(0.0, 0.0),
            size: 2.0,
            opacity: 0.3,
        }
    }

    #[test]
    fn links_pair_within_threshold() {
        let particles = vec![particle_at(0.0, 0.0), particle_at(100.0, 0.0)];
        let links = pairwise_links(&particles, 140.0, 0.15);
        assert_eq!(links.len(), 1);
        let expected = (1.0 - 100.0 / 140.0) * 0.15;
        assert!((links[0].opacity - expected).abs() <= 1e-5);
        assert!((links[0].opacity - 0.0429).abs() <= 1e-3);
    }

    #[test]
    fn no_link_at_or_beyond_threshold() {
        let particles = vec![particle_at(0.0, 0.0), particle_at(140.0, 0.0)];
        assert!(pairwise_links(&particles, 140.0, 0.15).is_empty());
        let particles = vec![particle_at(0.0, 0.0), particle_at(300.0, 0.0)];
        assert!(pairwise_links(&particles, 140.0, 0.15).is_empty());
    }

    #[test]
    fn no_self_links() {
        let particles = vec![particle_at(10.0, 10.0)];
        assert!(pairwise_links(&particles, 140.0, 0.15).is_empty());
    }

    #[test]
    fn links_are_order_independent() {
        let forward = vec![particle_at(0.0, 0.0), particle_at(50.0, 50.0), particle_at(400.0, 0.0)];
        let mut reversed = forward.clone();
        reversed.reverse();
        let a = pairwise_links(&forward, 140.0, 0.15);
        let b = pairwise_links(&reversed, 140.0, 0.15);
        assert_eq!(a.len(), b.len());
        for link in &a {
            assert!(b.iter().any(|other| {
                let same = other.a == link.a && other.b == link.b;
                let swapped = other.a == link.b && other.b == link.a;
                (same || swapped) && (other.opacity - link.opacity).abs() <= 1e-6
            }));
        }
    }

    #[test]
    fn link_count_matches_close_pairs() {
        // Three mutually close particles: all three pairs link.
        let particles = vec![
            particle_at(0.0, 0.0),
            particle_at(30.0, 0.0),
            particle_at(0.0, 30.0),
        ];
        assert_eq!(pairwise_links(&particles, 140.0, 0.15).len(), 3);
    }
}
