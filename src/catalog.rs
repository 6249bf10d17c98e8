/// Default test centre number shown on the exam information panel
pub const CENTRE_NUMBER: &str = "ES750";

/// One component of an exam. Listening papers are driven by their audio
/// track and are never counted down here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paper {
    pub name: &'static str,
    pub duration_minutes: u32,
    pub is_listening: bool,
}

impl Paper {
    const fn timed(name: &'static str, duration_minutes: u32) -> Self {
        Self {
            name,
            duration_minutes,
            is_listening: false,
        }
    }

    const fn listening(name: &'static str, duration_minutes: u32) -> Self {
        Self {
            name,
            duration_minutes,
            is_listening: true,
        }
    }

    pub fn duration_seconds(&self) -> u64 {
        crate::util::minutes_to_seconds(self.duration_minutes)
    }

    pub fn is_timed(&self) -> bool {
        !self.is_listening
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exam {
    pub name: &'static str,
    pub papers: &'static [Paper],
}

impl Exam {
    /// Exact-match lookup of a paper within this exam
    pub fn find_paper(&self, name: &str) -> Option<&'static Paper> {
        self.papers.iter().find(|p| p.name == name)
    }

    pub fn paper_names(&self) -> Vec<&'static str> {
        self.papers.iter().map(|p| p.name).collect()
    }
}

pub static CAMBRIDGE_EXAMS: &[Exam] = &[
    Exam {
        name: "A1 Starters",
        papers: &[
            Paper::timed("Reading & Writing", 20),
            Paper::listening("Listening", 20),
        ],
    },
    Exam {
        name: "A1 Movers",
        papers: &[
            Paper::timed("Reading & Writing", 30),
            Paper::listening("Listening", 25),
        ],
    },
    Exam {
        name: "A2 Flyers",
        papers: &[
            Paper::timed("Reading & Writing", 40),
            Paper::listening("Listening", 25),
        ],
    },
    Exam {
        name: "A2 Key",
        papers: &[
            Paper::timed("Reading & Writing", 60),
            Paper::listening("Listening", 30),
        ],
    },
    Exam {
        name: "A2 Key for Schools",
        papers: &[
            Paper::timed("Reading & Writing", 60),
            Paper::listening("Listening", 30),
        ],
    },
    Exam {
        name: "B1 Preliminary",
        papers: &[
            Paper::timed("Reading", 45),
            Paper::timed("Writing", 45),
            Paper::listening("Listening", 30),
        ],
    },
    Exam {
        name: "B1 Preliminary for Schools",
        papers: &[
            Paper::timed("Reading", 45),
            Paper::timed("Writing", 45),
            Paper::listening("Listening", 30),
        ],
    },
    Exam {
        name: "B2 First Certificate",
        papers: &[
            Paper::timed("Reading & Use of English", 75),
            Paper::timed("Writing", 80),
            Paper::listening("Listening", 40),
        ],
    },
    Exam {
        name: "B2 First Certificate for Schools",
        papers: &[
            Paper::timed("Reading & Use of English", 75),
            Paper::timed("Writing", 80),
            Paper::listening("Listening", 40),
        ],
    },
    Exam {
        name: "C1 Advanced",
        papers: &[
            Paper::timed("Reading & Use of English", 90),
            Paper::timed("Writing", 90),
            Paper::listening("Listening", 40),
        ],
    },
    Exam {
        name: "C2 Proficiency",
        papers: &[
            Paper::timed("Reading & Use of English", 90),
            Paper::timed("Writing", 90),
            Paper::listening("Listening", 40),
        ],
    },
];

/// Exact-match lookup. A miss is not an error: callers treat it as "no selection".
pub fn find_exam_by_name(name: &str) -> Option<&'static Exam> {
    CAMBRIDGE_EXAMS.iter().find(|e| e.name == name)
}

pub fn find_paper_by_name(exam: &Exam, name: &str) -> Option<&'static Paper> {
    exam.find_paper(name)
}

pub fn exam_names() -> Vec<&'static str> {
    CAMBRIDGE_EXAMS.iter().map(|e| e.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn finds_exam_by_exact_name() {
        let exam = find_exam_by_name("B2 First Certificate").unwrap();
        assert_eq!(exam.papers.len(), 3);
        assert_eq!(exam.papers[0].name, "Reading & Use of English");
        assert_eq!(exam.papers[0].duration_minutes, 75);
    }

    #[test]
    fn lookup_miss_returns_none() {
        assert!(find_exam_by_name("B2 First").is_none());
        assert!(find_exam_by_name("").is_none());
        assert!(find_exam_by_name("b2 first certificate").is_none());
        assert!(find_exam_by_name("\u{0}garbage\u{ffff}").is_none());
    }

    #[test]
    fn finds_paper_within_exam() {
        let exam = find_exam_by_name("C1 Advanced").unwrap();
        let writing = find_paper_by_name(exam, "Writing").unwrap();
        assert_eq!(writing.duration_minutes, 90);
        assert!(writing.is_timed());
        assert!(find_paper_by_name(exam, "Speaking").is_none());
    }

    #[test]
    fn exam_names_are_unique_and_ordered() {
        let names = exam_names();
        assert_eq!(names.len(), 11);
        assert_eq!(names.first(), Some(&"A1 Starters"));
        assert_eq!(names.last(), Some(&"C2 Proficiency"));
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn catalog_invariants_hold() {
        for exam in CAMBRIDGE_EXAMS {
            assert!(!exam.papers.is_empty(), "{} has no papers", exam.name);

            let unique: HashSet<_> = exam.paper_names().into_iter().collect();
            assert_eq!(unique.len(), exam.papers.len(), "{}", exam.name);

            for paper in exam.papers {
                assert!(paper.duration_minutes > 0);
            }

            let listening = exam.find_paper("Listening").unwrap();
            assert!(listening.is_listening);
            assert!(!listening.is_timed());
        }
    }

    #[test]
    fn paper_duration_in_seconds() {
        let exam = find_exam_by_name("A1 Starters").unwrap();
        assert_eq!(exam.papers[0].duration_seconds(), 1200);
    }
}
