use tokio::sync::OnceCell;

pub(crate) static INSERT_SCRIPT_HASH: OnceCell<String> = OnceCell::const_new();
pub(crate) static UPDATE_SCRIPT_HASH: OnceCell<String> = OnceCell::const_new();
pub(crate) static FETCH_SCRIPT_HASH: OnceCell<String> = OnceCell::const_new();

// KEYS: document key, index key.
// ARGV: _id, session_id, email, form_data, status, created_at, updated_at, score.
pub(crate) static INSERT_SCRIPT: &str = r#"
    local key = KEYS[1]
    local index = KEYS[2]

    if redis.call('EXISTS', key) == 1 then
        return 0
    end

    redis.call('HSET', key,
        '_id', ARGV[1],
        'session_id', ARGV[2],
        'email', ARGV[3],
        'form_data', ARGV[4],
        'status', ARGV[5],
        'created_at', ARGV[6],
        'updated_at', ARGV[7])
    redis.call('ZADD', index, ARGV[8], ARGV[2])

    return 1
"#;

// KEYS: document key. ARGV: field, value, updated_at.
// Timestamps are fixed-width text, so string comparison is chronological.
pub(crate) static UPDATE_SCRIPT: &str = r#"
    local key = KEYS[1]
    local field = ARGV[1]
    local value = ARGV[2]
    local updated_at = ARGV[3]

    if redis.call('EXISTS', key) == 0 then
        return 0
    end

    local created_at = redis.call('HGET', key, 'created_at')
    if created_at and updated_at < created_at then
        updated_at = created_at
    end

    redis.call('HSET', key, field, value, 'updated_at', updated_at)
    return 1
"#;

// KEYS: document keys. Returns seven values per key, flattened, in the order
// _id, session_id, email, form_data, status, created_at, updated_at.
// Missing fields come back as nil.
pub(crate) static FETCH_SCRIPT: &str = r#"
    local result = {}

    for _, key in ipairs(KEYS) do
        local values = redis.call('HMGET', key,
            '_id', 'session_id', 'email', 'form_data', 'status', 'created_at', 'updated_at')
        for _, value in ipairs(values) do
            result[#result + 1] = value
        end
    end

    return result
"#;
