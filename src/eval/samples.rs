/// A text with a human-written reference summary.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub id: &'static str,
    pub text: &'static str,
    pub reference: &'static str,
}

pub const SAMPLE_DATA: &[Sample] = &[
    Sample {
        id: "sample_1",
        text: "The company announced a new product update on Monday, introducing features aimed at improving \
               performance and reliability. Executives said the update was shaped by customer feedback and \
               would roll out gradually over the coming weeks. Analysts expect the changes to strengthen \
               the product's competitiveness, though they cautioned that adoption may vary across regions.",
        reference: "The company released a product update with new performance and reliability features, rolling \
                    out over the next few weeks after customer feedback.",
    },
    Sample {
        id: "sample_2",
        text: "A research team published findings showing that improved data cleaning and feature engineering \
               significantly boosted model stability. The authors evaluated multiple configurations and noted \
               that even small preprocessing changes could affect accuracy. They recommended standardized \
               evaluation protocols to improve reproducibility across future experiments.",
        reference: "Researchers found that better preprocessing improves model stability and recommended standardized \
                    evaluation protocols for reproducibility.",
    },
    Sample {
        id: "sample_3",
        text: "During the meeting, stakeholders aligned on priorities for the next quarter. The team will focus \
               on reducing latency, improving monitoring, and refining the user onboarding flow. A follow-up \
               session is scheduled to finalize milestones and confirm ownership across engineering and product.",
        reference: "Stakeholders agreed next-quarter priorities: reduce latency, improve monitoring, and refine onboarding, \
                    with a follow-up to finalize milestones and ownership.",
    },
];

/// The first `limit` samples, with `limit` clamped to `1..=SAMPLE_DATA.len()`.
pub fn take(limit: usize) -> &'static [Sample] {
    &SAMPLE_DATA[..limit.clamp(1, SAMPLE_DATA.len())]
}
