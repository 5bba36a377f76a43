//! Overlap-based rules: semester, teacher and multi-teacher collisions,
//! teacher availability, and cannot-collide pairs.
//!
//! Collisions are slot-based: every session's half-open range is expanded
//! into its slots, and each slot claimed by two or more sessions on the same
//! day produces one [`Collision`].

use std::collections::{BTreeMap, HashSet};

use super::report::{AvailabilityViolation, CannotCollidePair, Collision, CollisionScope};
use crate::models::{Catalog, Day, Hour, Placement, SessionId, COHORTS};

/// Groups the given sessions by occupied `(day, slot)`.
fn occupancy(
    catalog: &Catalog,
    placements: &[Placement],
    sessions: impl IntoIterator<Item = SessionId>,
) -> BTreeMap<(Day, Hour), Vec<SessionId>> {
    let mut slots: BTreeMap<(Day, Hour), Vec<SessionId>> = BTreeMap::new();
    for id in sessions {
        let placement = placements[id];
        for slot in placement.range(catalog.session(id).length).slots() {
            slots.entry((placement.day, slot)).or_default().push(id);
        }
    }
    slots
}

fn slot_collisions(
    catalog: &Catalog,
    placements: &[Placement],
    sessions: impl IntoIterator<Item = SessionId>,
    scope: CollisionScope,
) -> Vec<Collision> {
    occupancy(catalog, placements, sessions)
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((day, slot), sessions)| Collision {
            scope,
            day,
            slot,
            sessions,
        })
        .collect()
}

/// Overlaps inside each cohort's timetable.
pub(crate) fn semester_collisions(catalog: &Catalog, placements: &[Placement]) -> Vec<Collision> {
    (0..COHORTS)
        .flat_map(|cohort| {
            slot_collisions(
                catalog,
                placements,
                catalog.cohort_sessions(cohort).iter().copied(),
                CollisionScope::Cohort(cohort),
            )
        })
        .collect()
}

/// Overlaps inside each teacher's own sessions.
pub(crate) fn teacher_collisions(catalog: &Catalog, placements: &[Placement]) -> Vec<Collision> {
    (0..catalog.teachers().len())
        .flat_map(|teacher| {
            slot_collisions(
                catalog,
                placements,
                catalog.teacher_sessions(teacher).iter().copied(),
                CollisionScope::Teacher(teacher),
            )
        })
        .collect()
}

/// Overlaps between each co-teacher's sessions and the shared course.
pub(crate) fn multi_teacher_collisions(
    catalog: &Catalog,
    placements: &[Placement],
) -> Vec<Collision> {
    let mut collisions = Vec::new();
    for shared in catalog.shared_courses() {
        for &teacher in &shared.teachers {
            let mut sessions = catalog.teacher_sessions(teacher).to_vec();
            for &id in catalog.course_sessions(shared.course) {
                if !sessions.contains(&id) {
                    sessions.push(id);
                }
            }
            collisions.extend(slot_collisions(
                catalog,
                placements,
                sessions,
                CollisionScope::Teacher(teacher),
            ));
        }
    }
    collisions
}

/// Occupied slots a teacher declared unavailable, one record per slot.
pub(crate) fn availability_violations(
    catalog: &Catalog,
    placements: &[Placement],
) -> Vec<AvailabilityViolation> {
    let mut violations = Vec::new();
    for (index, teacher) in catalog.teachers().iter().enumerate() {
        let slots = occupancy(
            catalog,
            placements,
            catalog.teacher_sessions(index).iter().copied(),
        );
        for ((day, slot), sessions) in slots {
            if teacher.is_unavailable(day, slot) {
                violations.push(AvailabilityViolation {
                    teacher: index,
                    day,
                    slot,
                    sessions,
                });
            }
        }
    }
    violations
}

/// Same-day overlaps between sessions of courses declared incompatible.
///
/// Each unordered pair is recorded once, in the order first found.
pub(crate) fn cannot_collide_violations(
    catalog: &Catalog,
    placements: &[Placement],
) -> Vec<CannotCollidePair> {
    let mut seen: HashSet<(SessionId, SessionId)> = HashSet::new();
    let mut pairs = Vec::new();

    for session in catalog.sessions() {
        let placement = placements[session.id];
        let range = placement.range(session.length);

        for &course in catalog.conflicts(session.course) {
            for &other in catalog.course_sessions(course) {
                if other == session.id {
                    continue;
                }
                let other_placement = placements[other];
                if other_placement.day != placement.day {
                    continue;
                }
                let other_range = other_placement.range(catalog.session(other).length);
                if !range.overlaps(&other_range) {
                    continue;
                }
                let key = (session.id.min(other), session.id.max(other));
                if seen.insert(key) {
                    pairs.push(CannotCollidePair {
                        first: session.id,
                        second: other,
                    });
                }
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MONDAY, THURSDAY, TUESDAY};
    use crate::testing;

    #[test]
    fn test_one_collision_per_shared_slot() {
        let catalog = testing::sample_catalog();
        let mut placements = testing::monday_placements(&catalog);
        // spread every cohort except 0 so only cohort 0 stacks on Monday
        for session in catalog.sessions() {
            if session.cohort != 0 && !session.is_fixed() {
                placements[session.id] = Placement::new(TUESDAY + session.id % 3, 9);
            }
        }

        let collisions: Vec<Collision> = semester_collisions(&catalog, &placements)
            .into_iter()
            .filter(|c| c.scope == CollisionScope::Cohort(0))
            .collect();
        // cohort 0: 3h + 2h + 2h + 2h at Monday 9, slot 11 is the 3h tail
        assert_eq!(collisions.len(), 2);
        assert_eq!(collisions[0].slot, 9);
        assert_eq!(collisions[0].sessions.len(), 4);
        assert_eq!(collisions[1].slot, 10);
        assert_eq!(collisions[1].sessions.len(), 4);
    }

    #[test]
    fn test_adjacent_ranges_do_not_collide() {
        let catalog = testing::sample_catalog();
        let cohort_0 = catalog.cohort_sessions(0);
        let mut placements = testing::monday_placements(&catalog);
        // 2h session at 11 and 3h session at 13: [11,13) and [13,16)
        placements[cohort_0[1]] = Placement::new(MONDAY, 11);
        placements[cohort_0[0]] = Placement::new(MONDAY, 13);
        placements[cohort_0[2]] = Placement::new(THURSDAY, 9);
        placements[cohort_0[3]] = Placement::new(THURSDAY, 11);

        let collisions = semester_collisions(&catalog, &placements);
        assert!(collisions
            .iter()
            .all(|c| c.scope != CollisionScope::Cohort(0)));
    }

    #[test]
    fn test_teacher_and_shared_collisions() {
        let catalog = testing::sample_catalog();
        let mut placements: Vec<Placement> = catalog
            .sessions()
            .iter()
            .map(|s| s.pinned.unwrap_or(Placement::new(s.cohort % 5, 9)))
            .collect();
        // teacher 0 teaches course 0 (cohort 0) and is a co-teacher of the
        // seminar (cohort 3); put the seminar on top of course 0's lecture
        let seminar = catalog.course_sessions(7)[0];
        let lecture = catalog.cohort_sessions(0)[0];
        placements[lecture] = Placement::new(MONDAY, 14);
        placements[seminar] = Placement::new(MONDAY, 15);

        let shared = multi_teacher_collisions(&catalog, &placements);
        assert!(shared.iter().any(|c| c.scope == CollisionScope::Teacher(0)
            && c.day == MONDAY
            && c.slot == 15
            && c.sessions.contains(&seminar)
            && c.sessions.contains(&lecture)));
        // the placeholder teacher is not a co-teacher, so teacher 0's own
        // calendar does not see the seminar
        assert!(teacher_collisions(&catalog, &placements)
            .iter()
            .all(|c| !c.sessions.contains(&seminar)));
    }

    #[test]
    fn test_availability_one_record_per_slot() {
        let (mut teachers, courses, calendar) = testing::sample_input();
        teachers[0] = teachers[0].clone().with_unavailable(MONDAY, vec![9, 10]);
        let catalog = testing::catalog((teachers, courses, calendar));
        let mut placements = testing::monday_placements(&catalog);
        for session in catalog.sessions() {
            if session.cohort != 0 && !session.is_fixed() {
                placements[session.id] = Placement::new(THURSDAY, 9);
            }
        }

        let violations = availability_violations(&catalog, &placements);
        // teacher 0: 3h and 2h sessions both at Monday 9
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].slot, 9);
        assert_eq!(violations[0].sessions.len(), 2);
        assert_eq!(violations[1].slot, 10);
    }

    #[test]
    fn test_cannot_collide_pair_recorded_once() {
        let catalog = testing::sample_catalog();
        let placements = testing::monday_placements(&catalog);

        let pairs = cannot_collide_violations(&catalog, &placements);
        // course 0 (2 sessions) against course 10 (2 sessions), all Monday 9
        assert_eq!(pairs.len(), 4);
        let mut keys: Vec<_> = pairs
            .iter()
            .map(|p| (p.first.min(p.second), p.first.max(p.second)))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 4);
    }
}
