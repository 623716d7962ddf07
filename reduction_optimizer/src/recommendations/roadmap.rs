//! Implementation roadmaps

use super::profile::Pace;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub phase: String,
    pub duration: String,
    pub activities: Vec<String>,
}

/// Three-phase plan from assessment to ongoing monitoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub phases: Vec<RoadmapPhase>,
    pub total_timeline: String,
    pub key_milestones: Vec<String>,
}

fn phase(name: &str, duration: &str, activities: &[&str]) -> RoadmapPhase {
    RoadmapPhase {
        phase: name.to_string(),
        duration: duration.to_string(),
        activities: activities.iter().map(|a| a.to_string()).collect(),
    }
}

/// Duration of the implementation phase
pub fn implementation_duration(pace: Pace) -> &'static str {
    match pace {
        Pace::Short => "1-3 months",
        Pace::Medium => "3-9 months",
        Pace::Long => "9-18 months",
    }
}

impl Roadmap {
    pub fn for_pace(implementation_time: Pace) -> Self {
        let duration = implementation_duration(implementation_time);
        Self {
            phases: vec![
                phase(
                    "Planning & Assessment",
                    "2-4 weeks",
                    &[
                        "Conduct detailed feasibility study",
                        "Stakeholder alignment",
                        "Budget approval",
                        "Resource allocation",
                    ],
                ),
                phase(
                    "Implementation",
                    duration,
                    &[
                        "Project kickoff",
                        "System deployment/changes",
                        "Staff training",
                        "Initial testing",
                    ],
                ),
                phase(
                    "Monitoring & Optimization",
                    "Ongoing",
                    &[
                        "Performance tracking",
                        "Regular reporting",
                        "Continuous improvement",
                        "Impact measurement",
                    ],
                ),
            ],
            total_timeline: duration.to_string(),
            key_milestones: [
                "Feasibility study complete",
                "Implementation 50% complete",
                "Full deployment",
                "First impact measurement",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Pace::Short, "1-3 months")]
    #[case(Pace::Medium, "3-9 months")]
    #[case(Pace::Long, "9-18 months")]
    fn test_timeline_follows_implementation_time(#[case] pace: Pace, #[case] expected: &str) {
        let roadmap = Roadmap::for_pace(pace);
        assert_eq!(roadmap.phases.len(), 3);
        assert_eq!(roadmap.phases[1].duration, expected);
        assert_eq!(roadmap.total_timeline, expected);
        assert_eq!(roadmap.phases[2].duration, "Ongoing");
    }
}
