//! Built-in prompt collection

use super::{Category, PromptItem, Section};

const JIRA_SEARCH_SNIPPET: &str = r#"import requests
from requests.auth import HTTPBasicAuth

url = "https://your-domain.atlassian.net/rest/api/3/search"
auth = HTTPBasicAuth("email@example.com", "api_token")

query = {
   'jql': 'status changed to Blocked AFTER -2d'
}

response = requests.get(url, headers={"Accept": "application/json"}, params=query, auth=auth)
print(response.json())"#;

const PY_AUTH_SNIPPET: &str = r#"import requests
from requests.auth import HTTPBasicAuth

# Configuration
JIRA_DOMAIN = "your-domain.atlassian.net"
EMAIL = "user@example.com"
API_TOKEN = "your_api_token" # Create at https://id.atlassian.com/manage-profile/security/api-tokens

url = f"https://{JIRA_DOMAIN}/rest/api/3/myself"
auth = HTTPBasicAuth(EMAIL, API_TOKEN)

try:
    response = requests.get(url, headers={"Accept": "application/json"}, auth=auth)
    if response.status_code == 200:
        print(f"Authenticated as: {response.json()['displayName']}")
    else:
        print(f"Auth Failed: {response.status_code} - {response.text}")
except Exception as e:
    print(f"Connection Error: {e}")"#;

const PY_SEARCH_SNIPPET: &str = r#"import requests
from requests.auth import HTTPBasicAuth

url = "https://your-domain.atlassian.net/rest/api/3/search"
auth = HTTPBasicAuth("email@example.com", "your_api_token")

# JQL: Open Bugs in 'WEB' project ordered by priority
params = {
   'jql': 'project = WEB AND issuetype = Bug AND status != Done ORDER BY priority DESC',
   'maxResults': 10,
   'fields': 'summary,status,priority'
}

response = requests.get(url, headers={"Accept": "application/json"}, params=params, auth=auth)

for issue in response.json().get('issues', []):
    print(f"[{issue['key']}] {issue['fields']['summary']} ({issue['fields']['status']['name']})")"#;

const PY_UPDATE_SNIPPET: &str = r#"import requests
from requests.auth import HTTPBasicAuth
import json

issue_key = "WEB-123"
url = f"https://your-domain.atlassian.net/rest/api/3/issue/{issue_key}"
auth = HTTPBasicAuth("email@example.com", "your_api_token")

# Update Payload (Atlassian Document Format for description)
payload = {
    "fields": {
        "priority": {"name": "High"},
        "description": {
            "type": "doc",
            "version": 1,
            "content": [{
                "type": "paragraph",
                "content": [{"type": "text", "text": "Updated via Python Script."}]
            }]
        }
    }
}

headers = {"Accept": "application/json", "Content-Type": "application/json"}
response = requests.put(url, headers=headers, data=json.dumps(payload), auth=auth)

if response.status_code == 204:
    print("Issue updated successfully!")
else:
    print(f"Error: {response.status_code} - {response.text}")"#;

pub(super) fn builtin_sections() -> Vec<Section> {
    vec![
        Section::new(
            "waterfall-planning",
            "Waterfall: Planning",
            Category::Waterfall,
            "WBS, timelines, budgeting, scope, and initial planning.",
        )
        .with_items(vec![
            PromptItem::new(
                "wf-1",
                "Full WBS Generation",
                "Generate a full Work Breakdown Structure (WBS) for a large enterprise system implementation with phases: Initiation → Planning → Execution → Monitoring → Closure. detailed hierarchy.",
            )
            .with_tags(&["Planning", "WBS"]),
            PromptItem::new(
                "wf-2",
                "Scope Statement",
                "Create a project scope statement including specific goals, key deliverables, items in-scope, items out-of-scope, constraints, and assumptions.",
            )
            .with_tags(&["Scope", "Documentation"]),
            PromptItem::new(
                "wf-3",
                "Detailed Schedule",
                "Draft a detailed project schedule with major milestones, task dependencies, and assigned owners for a 6-month software development project.",
            )
            .with_tags(&["Schedule", "Timeline"]),
            PromptItem::new(
                "wf-4",
                "Critical Path Analysis",
                "Perform a Critical Path analysis for a construction project, including definitions of float, slack, and identification of high-risk areas.",
            )
            .with_tags(&["Analysis", "Risk"]),
            PromptItem::new(
                "wf-5",
                "Cost Baseline",
                "Prepare a cost baseline with phase-wise budget distribution for a $500k IT infrastructure upgrade.",
            )
            .with_tags(&["Budget", "Finance"]),
            PromptItem::new(
                "wf-6",
                "RACI Matrix",
                "Generate a RACI matrix for a multi-vendor technology program involving Client, Vendor A (Dev), Vendor B (QA), and Hosting Provider.",
            )
            .with_tags(&["Governance", "RACI"]),
        ]),
        Section::new(
            "waterfall-tracking",
            "Waterfall: Tracking & Monitoring",
            Category::Waterfall,
            "Progress tracking, EVM, and health dashboards.",
        )
        .with_items(vec![
            PromptItem::new(
                "wf-track-1",
                "Weekly Progress & EVM",
                "Create a weekly progress tracking report template including Earned Value Analysis metrics: Cost Performance Index (CPI), Schedule Performance Index (SPI), and Estimate at Completion (EAC).",
            )
            .with_tags(&["Reporting", "EVM"]),
            PromptItem::new(
                "wf-track-2",
                "Slippage Analysis",
                "Summarize key slippage drivers and root causes for schedule variance in a delayed software release.",
            )
            .with_tags(&["Analysis", "Risk"]),
            PromptItem::new(
                "wf-track-3",
                "Milestone Health Dashboard",
                "Produce a milestone health dashboard concept using RAG (Red-Amber-Green) status indicators for executive review.",
            )
            .with_tags(&["Dashboard", "Reporting"]),
        ]),
        Section::new(
            "agile-scrum",
            "Agile: Scrum Ceremonies",
            Category::Agile,
            "Sprint planning, daily standups, and retrospectives.",
        )
        .with_items(vec![
            PromptItem::new(
                "scrum-1",
                "Sprint Backlog Creation",
                "Create a sprint backlog based on team capacity of 40 points, average velocity of 35 points, and 5 points of carryover work.",
            )
            .with_tags(&["Planning", "Backlog"]),
            PromptItem::new(
                "scrum-2",
                "INVEST User Stories",
                "Draft 3 user stories for a \"Login Feature\" with acceptance criteria using the INVEST model (Independent, Negotiable, Valuable, Estimable, Small, Testable).",
            )
            .with_tags(&["User Stories", "Requirements"]),
            PromptItem::new(
                "scrum-3",
                "Sprint Goals",
                "Generate concise Sprint Goals aligned with a product roadmap focused on \"Improving Mobile User Retention\".",
            )
            .with_tags(&["Goals", "Strategy"]),
            PromptItem::new(
                "scrum-4",
                "Stand-up Note Summarizer",
                "Transform these raw notes into a structured \"Yesterday / Today / Blockers\" Daily Scrum format: [Insert Raw Notes Here]",
            )
            .with_tags(&["Daily Scrum", "Formatting"]),
            PromptItem::new(
                "scrum-5",
                "Retrospective Insights",
                "Generate retrospective insights and SMART action items based on the following team feedback: \"Too many meetings\", \"Requirements unclear\", \"Good team spirit\".",
            )
            .with_tags(&["Retro", "Improvement"]),
        ]),
        Section::new(
            "safe-framework",
            "SAFe: Enterprise Agility",
            Category::Safe,
            "PI Planning, ART Sync, and Inspect & Adapt.",
        )
        .with_items(vec![
            PromptItem::new(
                "safe-1",
                "PI Objectives",
                "Generate PI Objectives (distinguishing between committed and uncommitted) for 5 Agile teams working on an E-commerce Platform.",
            )
            .with_tags(&["PI Planning", "Objectives"]),
            PromptItem::new(
                "safe-2",
                "Dependency Board",
                "Create a text-based cross-team dependency board layout for Program Increment 4, showing timelines and potential risks.",
            )
            .with_tags(&["Planning", "Dependencies"]),
            PromptItem::new(
                "safe-3",
                "Inspect & Adapt Workshop",
                "Prepare material for an Inspect & Adapt workshop: Pareto chart data structure, Root Cause Analysis (RCA) template, and countermeasures list.",
            )
            .with_tags(&["I&A", "Workshop"]),
            PromptItem::new(
                "safe-4",
                "ART Flow Metrics",
                "Generate a narrative for an ART-level flow metrics dashboard explaining Flow Velocity, Flow Efficiency, and Flow Load.",
            )
            .with_tags(&["Metrics", "Reporting"]),
        ]),
        Section::new(
            "roles-pm",
            "Role: Project Manager",
            Category::Roles,
            "Prompts tailored for traditional Project Managers.",
        )
        .with_items(vec![
            PromptItem::new(
                "pm-1",
                "RAID Log",
                "Create a comprehensive RAID log (Risks, Assumptions, Issues, Dependencies) structure with probability, impact, owner, triggers, and mitigation plans.",
            )
            .with_tags(&["Risk", "Documentation"]),
            PromptItem::new(
                "pm-2",
                "Recovery Plan",
                "Prepare an executive summary for a \"Red\" project recovery plan, highlighting immediate actions, resource needs, and revised timeline.",
            )
            .with_tags(&["Crisis Mgmt", "Executive"]),
            PromptItem::new(
                "pm-3",
                "Vendor Evaluation",
                "Draft a vendor management evaluation matrix comparing 3 vendors on Cost, Technical Capability, and Cultural Fit.",
            )
            .with_tags(&["Procurement", "Analysis"]),
        ]),
        Section::new(
            "roles-qa",
            "Role: QA & Developers",
            Category::Roles,
            "Technical prompts for quality assurance and development.",
        )
        .with_items(vec![
            PromptItem::new(
                "qa-1",
                "Test Strategy",
                "Draft a high-level test strategy covering functional testing, non-functional testing (performance, security), and automation approach.",
            )
            .with_tags(&["QA", "Strategy"]),
            PromptItem::new(
                "dev-1",
                "API Documentation",
                "Generate an OpenAPI (Swagger) specification skeleton for a User Management API with endpoints: GET /users, POST /users, DELETE /users/{id}.",
            )
            .with_tags(&["Dev", "API"]),
            PromptItem::new(
                "dev-2",
                "Git Strategy",
                "Create a Git branching strategy document explaining Feature Branch Workflow vs Gitflow for a team of 10 developers.",
            )
            .with_tags(&["DevOps", "Process"]),
        ]),
        Section::new(
            "jira-auto",
            "Jira Automation Toolkit",
            Category::Jira,
            "JQL queries, dashboards, and Python scripts.",
        )
        .with_items(vec![
            PromptItem::new(
                "jql-1",
                "Find Blocked Issues",
                "Generate a JQL query to fetch all issues that were moved to \"BLOCKED\" status within the last 48 hours.",
            )
            .with_tags(&["JQL", "Query"]),
            PromptItem::new(
                "jql-2",
                "Scope Creep Finder",
                "Find all issues added to the active sprint after the sprint start date using JQL.",
            )
            .with_tags(&["JQL", "Scope"]),
            PromptItem::new(
                "jql-3",
                "Assignee Search",
                "Generate a JQL query to list all incomplete issues assigned to the \"currentUser()\" or a specific team member, ordered by priority.",
            )
            .with_tags(&["JQL", "Assignee"]),
            PromptItem::new(
                "jql-4",
                "Label Filtering",
                "Write a JQL query to find all tickets tagged with labels \"Production\" AND \"Critical\", excluding issues in \"Done\" status.",
            )
            .with_tags(&["JQL", "Labels"]),
            PromptItem::new(
                "jira-dash-1",
                "Release Metrics Dashboard",
                "Generate a text-based layout for a Jira dashboard focused on release metrics. Include gadgets for: Release Burndown Chart, Cycle Time trends, Release Scope (Story Points added vs completed), and Days Remaining in Release.",
            )
            .with_tags(&["Dashboard", "Metrics", "Release"]),
            PromptItem::new(
                "jira-py-1",
                "Python API Script",
                "Explain the following Python code for Jira API interaction.",
            )
            .with_code("python", JIRA_SEARCH_SNIPPET)
            .with_tags(&["Python", "Automation"]),
        ]),
        Section::new(
            "jira-python",
            "Jira: Python API Examples",
            Category::Jira,
            "Ready-to-use Python scripts for Authentication, Search, and Updates.",
        )
        .with_items(vec![
            PromptItem::new(
                "py-auth",
                "Authentication Setup",
                "Python script to securely authenticate with Jira Cloud using an API Token and email address. Use this base for all other scripts.",
            )
            .with_tags(&["Python", "Auth", "Setup"])
            .with_code("python", PY_AUTH_SNIPPET),
            PromptItem::new(
                "py-search",
                "Searching Issues (JQL)",
                "Search for issues using JQL (e.g., High priority bugs) and parse specific fields like Summary and Status from the response.",
            )
            .with_tags(&["Python", "Search", "JQL"])
            .with_code("python", PY_SEARCH_SNIPPET),
            PromptItem::new(
                "py-update",
                "Updating Issues",
                "Update an issue's description and priority via the REST API using a PUT request.",
            )
            .with_tags(&["Python", "Update", "REST"])
            .with_code("python", PY_UPDATE_SNIPPET),
        ]),
        Section::new(
            "inspiration-leadership",
            "Motivation & Leadership",
            Category::Inspiration,
            "Prompts to boost morale, resilience, and visionary thinking.",
        )
        .with_items(vec![
            PromptItem::new(
                "inspire-1",
                "Team Morale Booster",
                "Draft a short, energizing speech to boost team morale after a difficult sprint failure. Acknowledge the effort, reframe the failure as learning, and set a positive tone for the next iteration.",
            )
            .with_tags(&["Leadership", "Morale"]),
            PromptItem::new(
                "inspire-2",
                "Overcoming Imposter Syndrome",
                "Generate a supportive guide for a developer feeling imposter syndrome, using empathetic language and practical tips to build confidence and highlight their achievements.",
            )
            .with_tags(&["Coaching", "Empathy"]),
            PromptItem::new(
                "inspire-3",
                "The Stoic Project Manager",
                "Explain how the Stoic principle of \"Control what you can, accept what you cannot\" applies to managing project risks and stakeholder expectations, providing 3 practical examples.",
            )
            .with_tags(&["Stoicism", "Mindset"]),
            PromptItem::new(
                "inspire-4",
                "Why We Celebrate Bugs",
                "Draft an internal blog post titled \"Why We Celebrate Bugs\", reframing defects not as failures, but as necessary steps in the discovery, learning, and innovation process.",
            )
            .with_tags(&["Culture", "Innovation"]),
            PromptItem::new(
                "inspire-5",
                "Visionary Product Speech",
                "Write a Steve Jobs-style paragraph introducing a new internal tool. Focus not on the technical features, but on how it fundamentally changes the way the team works for the better.",
            )
            .with_tags(&["Vision", "Communication"]),
        ]),
    ]
}
