use crate::models::{Conversation, Message, Sender};
use chrono::{DateTime, Duration, Utc};

// (minutes before `now`, from the counterpart?, content, read)
type Line = (i64, bool, &'static str, bool);

struct Thread {
    participant: &'static str,
    role: &'static str,
    lines: &'static [Line],
}

const THREADS: &[Thread] = &[
    Thread {
        participant: "Dr. Sarah Johnson",
        role: "Cardiologist",
        lines: &[
            (30, true, "Good morning! I wanted to confirm the appointment for Mrs. Thompson tomorrow at 10 AM.", true),
            (27, false, "Yes, that's confirmed. I've already prepared her file and the necessary tests.", true),
            (25, true, "Perfect! Also, please make sure to have her latest blood work results ready.", true),
            (23, false, "Already done. The results are in her file and everything looks normal.", true),
            (5, true, "Excellent work as always. See you tomorrow!", false),
            (2, true, "Patient appointment confirmed for tomorrow", false),
        ],
    },
    Thread {
        participant: "Dr. Michael Brown",
        role: "Neurologist",
        lines: &[
            (40, false, "Any update on the MRI for bed 12?", true),
            (15, true, "Lab results are ready for review", true),
        ],
    },
    Thread {
        participant: "Nurse Emma Wilson",
        role: "Head Nurse",
        lines: &[
            (90, false, "Can you double check the dosage for room 4?", true),
            (60, true, "Medication schedule updated", false),
        ],
    },
    Thread {
        participant: "Dr. David Chen",
        role: "Emergency Medicine",
        lines: &[
            (150, true, "Emergency consultation needed", true),
            (140, false, "On my way down now.", true),
        ],
    },
];

/// Default conversation set for a store that has nothing persisted yet.
/// Timestamps are laid out relative to `now`, oldest first within each thread.
pub fn default_conversations(now: DateTime<Utc>) -> Vec<Conversation> {
    let mut next_id = 1;
    THREADS
        .iter()
        .zip(1u64..)
        .map(|(thread, conv_id)| {
            let mut conv = Conversation::new(conv_id, thread.participant, thread.role);
            for &(minutes_ago, theirs, content, read) in thread.lines {
                let sender = if theirs {
                    Sender::participant(thread.participant)
                } else {
                    Sender::CurrentUser
                };
                conv.messages.push(Message {
                    id: next_id,
                    sender,
                    content: content.to_string(),
                    timestamp: now - Duration::minutes(minutes_ago),
                    read,
                });
                next_id += 1;
            }
            conv
        })
        .collect()
}
