//! Voice-assistant configuration registered with the assistant platform.

use serde_json::{json, Value};

pub const ASSISTANT_API_URL: &str = "https://api.vapi.ai/assistant";
pub const ASSISTANT_NAME: &str = "RoutePilot";
pub const SEARCH_TOOL_NAME: &str = "search_flights";

const SYSTEM_PROMPT: &str = "\
You are a professional flight deal finder.

Rules:
- Never invent prices, routes, airlines, or times.
- You may ONLY speak about flight info returned by tools.
- If flight data is unavailable, say so clearly.
- Always confirm search constraints before calling tools, make sure you have all of the required info.
- Optimize based on the user's stated priorities.
- Explain WHY a route is cheaper or faster based on the summaries and info received from the tool.
- Speak concisely and confidently.";

/// JSON schema of the `search_flights` tool arguments.
pub fn search_tool_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "origin": {"type": "string"},
            "destination": {"type": "string"},
            "departure_date": {"type": "string", "format": "date"},
            "return_date": {"type": ["string", "null"]},
            "adults": {"type": "integer", "minimum": 1},
            "currency_code": {"type": "string"},
            "max_price": {"type": ["integer", "null"]},
            "allow_nearby_airports": {"type": "boolean"},
            "max_results": {"type": "integer", "minimum": 1},
            "preferences": {
                "type": "object",
                "properties": {
                    "optimize_for": {"type": "string", "enum": ["price", "time"]},
                    "carry_on_only": {"type": "boolean"},
                    "allow_overnight_layovers": {"type": "boolean"},
                    "allow_self_transfer": {"type": "boolean"}
                }
            }
        },
        "required": ["origin", "destination", "departure_date", "adults"]
    })
}

/// Full assistant definition pointing its tool calls at `server_url`.
pub fn assistant_payload(server_url: &str) -> Value {
    json!({
        "name": ASSISTANT_NAME,
        "model": {
            "provider": "openai",
            "model": "gpt-4o"
        },
        "voice": {
            "provider": "elevenlabs",
            "voiceId": "Rachel"
        },
        "systemPrompt": SYSTEM_PROMPT,
        "tools": [
            {
                "type": "function",
                "function": {
                    "name": SEARCH_TOOL_NAME,
                    "description": "Search for flight routes",
                    "parameters": search_tool_parameters()
                }
            }
        ],
        "server": {
            "url": server_url
        }
    })
}
