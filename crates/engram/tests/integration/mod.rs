mod mcp_failover;
mod scenarios;

mod support;
