//! Prompt builder
//!
//! Pure string assembly for every model call the crate makes. Nothing here
//! talks to a provider, so the exact wording is covered by unit tests.

use crate::catalog::Catalog;
use crate::models::{GenerationRequest, PainPoint, SocialRequest};
use serde::{Deserialize, Serialize};

/// System prompt for comprehensive generation
pub const COMPREHENSIVE_SYSTEM_PROMPT: &str = "You are an expert digital product creator. \
Create comprehensive, professional, and valuable content that solves real problems for the target audience.

Focus on:
- Actionable, practical advice
- Professional presentation
- Clear structure and organization
- Genuine value for the target audience
- Commercial viability and marketability";

/// Appended to product prompts. The parser reads this block before falling
/// back to pattern matching.
pub const STRUCTURED_OUTPUT_CONTRACT: &str = "**STRUCTURED SUMMARY:**
After the full content, append exactly one fenced ```json block containing a single object with these keys:
- \"title\": string
- \"subtitle\": string
- \"tableOfContents\": array of strings
- \"monetizationSuggestions\": array of 5-7 strings
- \"marketingChannels\": array of 6-8 strings
- \"priceRange\": string such as \"$19.99 - $49.99\"
Do not put anything after the closing fence.";

const PRODUCT_SECTIONS: &str = "Please generate a complete, professional digital product with the following structure:

**TITLE & SUBTITLE:**
- Create a compelling, marketable title
- Write an engaging subtitle that clearly communicates value

**CONTENT STRUCTURE:**
- Introduction that hooks the reader
- 5-8 main sections with detailed content
- Each section should have 3-5 subsections
- Include actionable tips, strategies, and examples
- Add practical exercises or worksheets where relevant
- Conclude with next steps and resources

**TABLE OF CONTENTS:**
- List all main sections and subsections
- Use clear, descriptive headings

**MONETIZATION STRATEGIES:**
- 5-7 specific ways to monetize this product
- Include pricing strategies and market positioning
- Suggest upsells and cross-sells

**MARKETING CHANNELS:**
- 6-8 specific marketing channels and tactics
- Include social media strategies
- Suggest content marketing approaches

**PRICE RANGE:**
- Provide a realistic price range based on value and market
- Consider different pricing tiers

**COVER DESIGN SUGGESTIONS:**
- Describe visual elements and color schemes
- Suggest typography and layout ideas

Make the content professional, actionable, and ready for commercial use. \
Ensure it provides genuine value and solves real problems for the target audience.";

const COMPREHENSIVE_SECTIONS: &str = "Please generate a complete, professional digital product with the following structure:

**TITLE & SUBTITLE:**
- Create a compelling, marketable title
- Write an engaging subtitle that clearly communicates value

**CONTENT STRUCTURE:**
- Introduction that hooks the reader and establishes credibility
- 5-8 main sections with detailed, actionable content
- Each section should have 3-5 subsections with practical advice
- Include real examples, case studies, and actionable tips
- Add practical exercises, worksheets, or checklists where relevant
- Conclude with clear next steps and additional resources

**TABLE OF CONTENTS:**
- List all main sections and subsections
- Use clear, descriptive headings that promise value

**MONETIZATION STRATEGIES:**
- 5-7 specific ways to monetize this product
- Include pricing strategies and market positioning
- Suggest upsells, cross-sells, and product ecosystem opportunities

**MARKETING CHANNELS:**
- 6-8 specific marketing channels and tactics
- Include platform-specific strategies
- Suggest content marketing and partnership approaches

**PRICE RANGE:**
- Provide a realistic price range based on value and market
- Consider different pricing tiers and packages

**COVER DESIGN SUGGESTIONS:**
- Describe visual elements, color schemes, and typography
- Suggest layout ideas that appeal to the target audience

Make the content professional, actionable, and ready for commercial use. \
Ensure it provides genuine value and solves real problems for the target audience.";

/// Generation prompt for one product, tailored to the model's specialization
pub fn build_product_prompt(catalog: &Catalog, request: &GenerationRequest) -> String {
    format!(
        "Create a comprehensive {} for the {} niche, targeting {} with a {} tone.\n\n\
         Requirements: {}\n\n{}\n\n**SPECIALIZATION FOCUS:** {}\n\n{}",
        request.product_type,
        request.niche,
        request.target_audience,
        request.tone,
        request.requirements,
        PRODUCT_SECTIONS,
        catalog.focus_for(&request.ai_model),
        STRUCTURED_OUTPUT_CONTRACT,
    )
}

/// Prompt paired with [`COMPREHENSIVE_SYSTEM_PROMPT`]
pub fn build_comprehensive_prompt(request: &GenerationRequest) -> String {
    format!(
        "Create a comprehensive {} for the {} niche.\n\n\
         TARGET AUDIENCE: {}\nTONE: {}\nREQUIREMENTS: {}\n\n{}",
        request.product_type,
        request.niche,
        request.target_audience,
        request.tone,
        request.requirements,
        COMPREHENSIVE_SECTIONS,
    )
}

/// Prompt grounded in `context`, one `"{title}: {snippet}"` line per result
pub fn build_search_enhanced_prompt(
    topic: &str,
    product_type: &str,
    target_audience: &str,
    context: &str,
) -> String {
    format!(
        "Based on the latest information and trends, create a comprehensive {} about {} for {}.\n\n\
         CURRENT TRENDS AND INFORMATION:\n{}\n\n\
         Create content that:\n\
         1. Incorporates the latest trends and information\n\
         2. Addresses current challenges and opportunities\n\
         3. Provides up-to-date strategies and tactics\n\
         4. References recent developments and changes\n\
         5. Offers timely, relevant advice\n\n\
         Generate a complete product outline with current, actionable content.",
        product_type, topic, target_audience, context
    )
}

/// General-purpose rewrite styles, served by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementKind {
    Humanize,
    Professional,
    Engaging,
}

impl EnhancementKind {
    fn instruction(self) -> &'static str {
        match self {
            EnhancementKind::Humanize => "Rewrite this content to sound more human, natural, and conversational while maintaining professionalism.",
            EnhancementKind::Professional => "Enhance this content to sound more professional, authoritative, and polished.",
            EnhancementKind::Engaging => "Make this content more engaging, compelling, and action-oriented to capture reader attention.",
        }
    }
}

pub fn build_enhancement_prompt(content: &str, kind: EnhancementKind) -> String {
    format!("{}\n\nContent to enhance:\n{}", kind.instruction(), content)
}

/// Rewrites handled by a dedicated model from the catalog's specialist table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialistKind {
    Structure,
    Technical,
    Humanize,
    Business,
    Format,
}

impl SpecialistKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SpecialistKind::Structure => "structure",
            SpecialistKind::Technical => "technical",
            SpecialistKind::Humanize => "humanize",
            SpecialistKind::Business => "business",
            SpecialistKind::Format => "format",
        }
    }
}

/// `(system_prompt, prompt)` for a specialist rewrite
pub fn build_specialist_prompts(instruction: &str, kind: SpecialistKind, content: &str) -> (String, String) {
    (
        format!(
            "You are an expert content enhancer specializing in {}. {}",
            kind.as_str(),
            instruction
        ),
        format!("Please enhance the following content:\n\n{}", content),
    )
}

// ============================================================================
// Social
// ============================================================================

pub fn build_post_prompt(catalog: &Catalog, request: &SocialRequest) -> String {
    let platform = request.platform_or_general();
    let target = request
        .platform
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or("general social media");

    format!(
        "Create a {length} {tone_lower} social media post for {target} about \"{topic}\" targeting {audience}.

**PLATFORM SPECIFICATIONS:**
{specs}

**CONTENT REQUIREMENTS:**
- Topic: {topic}
- Tone: {tone}
- Target Audience: {audience}
- Length: {length}
- Keywords to include: {keywords}
- Include hashtags: {hashtags}
- Include call-to-action: {cta}
- Additional requirements: {extra}

**OUTPUT FORMAT:**
Please provide:
1. **TITLE:** A compelling title for the post
2. **CONTENT:** The main post content optimized for the platform
3. **HASHTAGS:** 10-15 relevant hashtags (if requested)
4. **CALL_TO_ACTION:** A compelling CTA (if requested)
5. **ENGAGEMENT_TIPS:** 5 tips to boost engagement
6. **BEST_POSTING_TIMES:** Optimal posting times for this platform

Make the content engaging, platform-appropriate, and designed to maximize reach and engagement.",
        length = request.content_length.as_str(),
        tone_lower = request.tone.to_lowercase(),
        tone = request.tone,
        target = target,
        topic = request.topic,
        audience = request.target_audience,
        specs = catalog.platform_spec(platform),
        keywords = request.keywords.join(", "),
        hashtags = request.include_hashtags,
        cta = request.include_call_to_action,
        extra = request.additional_requirements,
    )
}

pub fn build_blog_prompt(request: &SocialRequest) -> String {
    format!(
        "Create a comprehensive, SEO-optimized blog post about \"{topic}\" with a {tone_lower} tone for {audience}.

**CONTENT REQUIREMENTS:**
- Topic: {topic}
- Tone: {tone}
- Target Audience: {audience}
- Length: {length} (short: 500-800 words, medium: 800-1500 words, long: 1500+ words)
- Keywords to include: {keywords}
- Additional requirements: {extra}

**OUTPUT FORMAT:**
Please provide:
1. **TITLE:** SEO-optimized title (50-60 characters)
2. **META_DESCRIPTION:** Meta description (150-160 characters)
3. **CONTENT:** Full blog post with headers, subheaders, and engaging content
4. **KEYWORDS:** Primary and secondary keywords
5. **READING_TIME:** Estimated reading time
6. **SEO_SCORE:** Estimated SEO score (1-10)
7. **HASHTAGS:** Social media hashtags for promotion
8. **CALL_TO_ACTION:** Compelling CTA for the end of the post

Structure the content with:
- Engaging introduction
- Clear headers and subheaders
- Actionable insights
- Conclusion with next steps
- SEO optimization throughout",
        topic = request.topic,
        tone_lower = request.tone.to_lowercase(),
        tone = request.tone,
        audience = request.target_audience,
        length = request.content_length.as_str(),
        keywords = request.keywords.join(", "),
        extra = request.additional_requirements,
    )
}

pub fn build_meme_prompt(request: &SocialRequest) -> String {
    format!(
        "Create a viral meme concept about \"{topic}\" with a {tone_lower} tone for {audience}.

**MEME REQUIREMENTS:**
- Topic: {topic}
- Tone: {tone}
- Target Audience: {audience}
- Platform: {platform}
- Keywords: {keywords}
- Additional requirements: {extra}

**OUTPUT FORMAT:**
Please provide:
1. **TITLE:** Catchy meme title
2. **IMAGE_PROMPT:** Detailed description for meme image creation
3. **CAPTION:** Meme text/caption that goes on the image
4. **CONTENT:** Additional text content to accompany the meme
5. **HASHTAGS:** Trending hashtags for maximum reach
6. **VIRAL_POTENTIAL:** Assessment of viral potential (1-10)
7. **ENGAGEMENT_TIPS:** Tips to maximize meme engagement

Make it relatable, shareable, and aligned with current meme trends while staying relevant to the topic.",
        topic = request.topic,
        tone_lower = request.tone.to_lowercase(),
        tone = request.tone,
        audience = request.target_audience,
        platform = request.platform_or_general(),
        keywords = request.keywords.join(", "),
        extra = request.additional_requirements,
    )
}

pub fn build_hashtag_prompt(topic: &str, platform: &str) -> String {
    format!(
        "Generate 15-20 trending hashtags for \"{}\" optimized for {}.

Include a mix of:
- Popular trending hashtags
- Niche-specific hashtags
- Branded hashtags
- Community hashtags
- Location-based hashtags (if relevant)

Return as a simple list, one hashtag per line, including the # symbol.",
        topic, platform
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialEnhancement {
    Viral,
    Engagement,
    Trending,
}

impl SocialEnhancement {
    fn instruction(self) -> &'static str {
        match self {
            SocialEnhancement::Viral => "Rewrite this content to maximize viral potential. Add hooks, emotional triggers, and shareable elements while maintaining the core message.",
            SocialEnhancement::Engagement => "Enhance this content to boost engagement. Add questions, calls for interaction, and elements that encourage comments and shares.",
            SocialEnhancement::Trending => "Update this content with current trends, trending topics, and popular culture references while keeping it relevant and authentic.",
        }
    }
}

pub fn build_social_enhancement_prompt(content: &str, kind: SocialEnhancement) -> String {
    format!("{}\n\nOriginal content:\n{}", kind.instruction(), content)
}

// ============================================================================
// Trending
// ============================================================================

pub fn build_trending_topics_prompt(query: &str) -> String {
    format!(
        "Based on the search query \"{}\" and current trends, generate 5-8 trending topics that would be perfect for digital product creation.

For each topic, provide:
- A catchy title
- Brief description
- Category (Business, Health, Technology, Finance, etc.)
- Search volume estimate (Low/Medium/High/Very High)
- Monetization difficulty (Low/Medium/High)
- Monetization potential (Low/Medium/High/Very High)
- 3-5 relevant keywords
- 3-4 related subtopics

Also suggest 5-8 image prompts that would work well for visual content related to these topics.

Format as JSON with this structure:
{{
  \"topics\": [
    {{
      \"id\": \"unique-id\",
      \"title\": \"Topic Title\",
      \"description\": \"Brief description\",
      \"category\": \"Category\",
      \"searchVolume\": \"High\",
      \"difficulty\": \"Medium\",
      \"monetizationPotential\": \"High\",
      \"keywords\": [\"keyword1\", \"keyword2\"],
      \"relatedTopics\": [\"subtopic1\", \"subtopic2\"]
    }}
  ],
  \"imagePrompts\": [
    \"Professional image prompt for visual content\"
  ]
}}",
        query
    )
}

pub fn build_image_prompts_prompt(product_type: &str, niche: &str) -> String {
    format!(
        "Generate 8-10 detailed image prompts for creating visual content for a {} about {}.

The prompts should be:
- Specific and detailed for AI image generation
- Professional and high-quality
- Suitable for commercial use
- Varied in style (photography, illustrations, graphics, etc.)
- Optimized for social media and marketing

Return as a JSON array of strings.",
        product_type, niche
    )
}

pub fn build_prompt_enhancement(original: &str, product_type: &str) -> String {
    format!(
        "Enhance this prompt for creating a {}:

Original prompt: \"{}\"

Make it more:
- Specific and actionable
- Commercially viable
- Engaging and compelling
- Optimized for the target audience
- Include trending keywords and phrases

Return only the enhanced prompt, no additional text.",
        product_type, original
    )
}

// ============================================================================
// Pain points
// ============================================================================

pub const PAIN_POINT_ANALYST_PROMPT: &str = "You are an expert market researcher and business analyst. \
Provide comprehensive, actionable insights based on real market data and trends.";

pub const PRODUCT_STRATEGIST_PROMPT: &str = "You are a product strategy expert. \
Create detailed product specifications that directly address market pain points.";

pub fn build_pain_point_analysis_prompt(
    topic: &str,
    search_results: &str,
    target_audience: &str,
    platforms: &[String],
) -> String {
    format!(
        "Analyze the following search results to identify pain points and market opportunities related to \"{topic}\".

SEARCH RESULTS:
{search_results}

TARGET AUDIENCE: {target_audience}
PLATFORMS: {platforms}

Please provide a comprehensive analysis in the following JSON format:

{{
  \"painPoints\": [
    {{
      \"id\": \"unique-id\",
      \"title\": \"Pain Point Title\",
      \"description\": \"Detailed description of the problem\",
      \"platform\": \"Platform where this was found\",
      \"audience\": \"Specific audience affected\",
      \"urgency\": \"High|Medium|Low|Critical\",
      \"marketSize\": \"Estimated market size\",
      \"keywords\": [\"keyword1\", \"keyword2\"],
      \"relatedProblems\": [\"related problem 1\"],
      \"suggestedSolutions\": [\"solution 1\", \"solution 2\"],
      \"marketingChannels\": [\"channel1\", \"channel2\"],
      \"competitionLevel\": \"High|Medium|Low\",
      \"monetizationPotential\": \"Very High|High|Medium|Low\",
      \"estimatedDemand\": \"High|Medium|Low\"
    }}
  ],
  \"productSuggestions\": [
    {{
      \"id\": \"product-id\",
      \"productType\": \"eBook|Planner|Course|etc\",
      \"title\": \"Product Title\",
      \"description\": \"Product description\",
      \"targetAudience\": \"Specific target audience\",
      \"painPointsAddressed\": [\"pain point 1\", \"pain point 2\"],
      \"marketingStrategy\": [\"strategy 1\", \"strategy 2\"],
      \"priceRange\": \"$X - $Y\",
      \"timeToMarket\": \"X weeks\",
      \"competitiveAdvantage\": \"What makes this unique\",
      \"validationSteps\": [\"step 1\", \"step 2\"]
    }}
  ],
  \"marketInsights\": {{
    \"totalMarketSize\": \"Market size estimate\",
    \"growthTrend\": \"Growing|Stable|Declining\",
    \"keyOpportunities\": [\"opportunity 1\"],
    \"threats\": [\"threat 1\"]
  }},
  \"actionPlan\": {{
    \"immediateActions\": [\"action 1\"],
    \"shortTerm\": [\"action 1\"],
    \"longTerm\": [\"action 1\"]
  }}
}}

Focus on:
1. Real problems people are discussing
2. Gaps in current solutions
3. Underserved audiences
4. Trending issues with commercial potential
5. Specific, actionable product ideas
6. Clear marketing strategies for each platform",
        topic = topic,
        search_results = search_results,
        target_audience = target_audience,
        platforms = platforms.join(", "),
    )
}

pub fn build_product_spec_prompt(pain_point: &PainPoint) -> String {
    format!(
        "Based on this pain point, generate a complete product specification:

PAIN POINT:
- Title: {}
- Description: {}
- Audience: {}
- Platform: {}
- Keywords: {}
- Suggested Solutions: {}

Create a product specification that directly addresses this pain point. Return as JSON:

{{
  \"productType\": \"Most suitable product type (eBook, Planner, Course, etc.)\",
  \"niche\": \"Specific niche/topic for the product\",
  \"targetAudience\": \"Detailed target audience description\",
  \"tone\": \"Professional|Conversational|Inspirational|Educational|Friendly|Authoritative\",
  \"length\": \"Short (5-10 pages)|Medium (15-25 pages)|Long (30-50 pages)|Comprehensive (50+ pages)\",
  \"additionalRequirements\": \"Specific requirements, features, and elements to include\"
}}",
        pain_point.title,
        pain_point.description,
        pain_point.audience,
        pain_point.platform,
        pain_point.keywords.join(", "),
        pain_point.suggested_solutions.join(", "),
    )
}
