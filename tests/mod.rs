
// Integration tests, grouped by area:
// - mocks: in-memory Workjam and Google Calendar implementations
// - suite::pipeline: schedule events through consolidation, enrichment and rendering
// - suite::sync: reconciling rendered events against a calendar
// - suite::workjam_client: the HTTP client against a mock server
