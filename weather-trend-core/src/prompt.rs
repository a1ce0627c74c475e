use crate::model::TrendPrompt;

/// Build the instruction sent to the LLM. Missing inputs become empty strings.
///
/// The three numbered sections line up with the keyword buckets the analyzer
/// uses to split the answer, so rewording must keep "weather", "impact" and
/// "sunny" in the respective sections.
pub fn compose(video: Option<&str>, historical: Option<&str>, forecast: Option<&str>) -> TrendPrompt {
    let video = video.unwrap_or_default();
    let historical = historical.unwrap_or_default();
    let forecast = forecast.unwrap_or_default();

    TrendPrompt::new(format!(
        "Task: You are a meteorologist presenting a short, accessible weather analysis in the style \
of a TV forecast. You speak warmly and clearly for ordinary people. Analyse the weather data for \
ancient Heliopolis (today's Obzor), the City of the Sun, using a combination of live video, \
historical and forecast data.

Current frame from Obzor: {video}

Historical data (yesterday): {historical}

Forecast data: {forecast}

Please write, in a warm and accessible tone, three separate paragraphs:
1. What the weather is like right now, as on the news, describing how the town and the sea look.
2. The impact of the current conditions on how people in the town are feeling.
3. Whether the day is \"sunny\" for ancient Heliopolis (a sunny day is one on which the Sun is \
visible and shines at least partially).

Important aspects:
- Avoid technical terms
- Speak warmly and inspiringly
- Pay attention to sea conditions
- With wind from the east or north-east the sea is rougher
- A north-westerly wind calms the waves

The answer must be in English, accessible and inspiring. Do not use introductory phrases."
    ))
}
