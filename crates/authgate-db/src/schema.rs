/// Table layout owned by the authentication service.
///
/// The real schema is generated and migrated by the ORM tooling; this module
/// only carries the statements authgate reads with, plus a copy of the
/// SQLite DDL for bootstrapping scratch databases.
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const AUTH_SCHEMA_SQLITE: Migration = Migration {
    version: 1,
    name: "init",
    sql: r#"
CREATE TABLE IF NOT EXISTS "user" (
    "id" TEXT NOT NULL PRIMARY KEY,
    "name" TEXT NOT NULL,
    "email" TEXT NOT NULL,
    "emailVerified" BOOLEAN NOT NULL DEFAULT false,
    "image" TEXT,
    "createdAt" DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    "updatedAt" DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS "session" (
    "id" TEXT NOT NULL PRIMARY KEY,
    "expiresAt" DATETIME NOT NULL,
    "token" TEXT NOT NULL,
    "createdAt" DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    "updatedAt" DATETIME NOT NULL,
    "ipAddress" TEXT,
    "userAgent" TEXT,
    "userId" TEXT NOT NULL,
    CONSTRAINT "session_userId_fkey" FOREIGN KEY ("userId") REFERENCES "user" ("id") ON DELETE CASCADE ON UPDATE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS "user_email_key" ON "user"("email");
CREATE UNIQUE INDEX IF NOT EXISTS "session_token_key" ON "session"("token");
"#,
};

pub const SESSION_LOOKUP_SQLITE: &str = r#"
SELECT s."id", s."expiresAt", u."id", u."name", u."email"
FROM "session" s
JOIN "user" u ON u."id" = s."userId"
WHERE s."token" = ?1
"#;

pub const SESSION_LOOKUP_POSTGRES: &str = r#"
SELECT s."id" AS session_id, s."expiresAt" AS expires_at,
       u."id" AS user_id, u."name" AS user_name, u."email" AS user_email
FROM "session" s
JOIN "user" u ON u."id" = s."userId"
WHERE s."token" = $1
"#;
